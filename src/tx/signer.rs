//! Transaction signing seam
//!
//! # Security
//! Key material stays on the caller's side of this trait. The client never
//! reads, stores, or logs private keys; it only forwards the decoded
//! transaction request and records the returned signed payload.

use async_trait::async_trait;

use crate::error::Result;
use crate::tx::payload::TransactionRequest;

/// Signs structured transaction requests with a locally held key.
///
/// Implementations return the raw signed transaction as a 0x-prefixed hex
/// string; the envelope strips the prefix before the payload is submitted
/// for broadcast.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(&self, request: &TransactionRequest) -> Result<String>;
}
