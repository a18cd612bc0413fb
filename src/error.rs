//! Error types for the wallet platform client

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wallet platform client
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors - raised before any network call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    // Payload errors - a server-supplied payload could not be decoded
    #[error("Invalid unsigned payload: {0}")]
    InvalidUnsignedPayload(String),

    // Signing errors
    #[error("No local signer configured; signing must be performed server-side")]
    NoSigner,

    #[error("Signing failed: {0}")]
    Signing(String),

    // Wait loop
    #[error("Timed out after {elapsed:?} waiting for a terminal status")]
    WaitTimeout { elapsed: Duration },

    // Remote errors - classified by response code, never retried by the client
    #[error("Resource not found ({code}): {message} [correlation-id: {correlation_id}]")]
    NotFound {
        code: String,
        message: String,
        correlation_id: String,
    },

    #[error("Malformed request ({code}): {message} [correlation-id: {correlation_id}]")]
    MalformedRequest {
        code: String,
        message: String,
        correlation_id: String,
    },

    #[error("Rate limit exceeded ({code}): {message} [correlation-id: {correlation_id}]")]
    RateLimited {
        code: String,
        message: String,
        correlation_id: String,
    },

    #[error("Resource already exists ({code}): {message} [correlation-id: {correlation_id}]")]
    AlreadyExists {
        code: String,
        message: String,
        correlation_id: String,
    },

    #[error("API error {status} ({code}): {message} [correlation-id: {correlation_id}]")]
    Api {
        status: u16,
        code: String,
        message: String,
        correlation_id: String,
    },

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    // Transport errors
    #[error("HTTP transport error: {0}")]
    Http(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error is a local validation failure.
    ///
    /// Validation errors are raised before any network call and are always
    /// recoverable by retrying with corrected input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::UnsupportedAsset(_)
                | Error::InsufficientFunds { .. }
        )
    }

    /// Check if this error originated from the collaborator API
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::MalformedRequest { .. }
                | Error::RateLimited { .. }
                | Error::AlreadyExists { .. }
                | Error::Api { .. }
                | Error::MalformedResponse(_)
        )
    }
}

// Conversion from reqwest transport errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}
