//! Transaction envelope - the record of a single on-chain transaction
//!
//! An envelope moves PENDING -> BROADCAST -> COMPLETE | FAILED. The two
//! terminal states absorb: once reached, reloads never change the status.

use tracing::{debug, warn};

use crate::api::models::TransactionModel;
use crate::error::{Error, Result};
use crate::tx::payload::decode_unsigned_payload;
use crate::tx::signer::TransactionSigner;

/// On-chain status of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Created, not yet broadcast
    Pending,
    /// Signed payload submitted, hash assigned, not yet in a confirmed block
    Broadcast,
    /// Included in a block, execution succeeded
    Complete,
    /// Execution reverted or network-level failure
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Complete | TransactionStatus::Failed)
    }

    /// Parse a wire status string. Unknown values return `None` so callers
    /// can keep the last known status instead of guessing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TransactionStatus::Pending),
            "broadcast" => Some(TransactionStatus::Broadcast),
            "complete" => Some(TransactionStatus::Complete),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// A single on-chain transaction owned by exactly one operation.
#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
    network_id: String,
    from_address_id: String,
    to_address_id: Option<String>,
    unsigned_payload: String,
    signed_payload: Option<String>,
    transaction_hash: Option<String>,
    transaction_link: Option<String>,
    status: TransactionStatus,
}

impl TransactionEnvelope {
    /// Build an envelope from a server model.
    pub fn from_model(model: &TransactionModel) -> Self {
        let status = TransactionStatus::parse(&model.status).unwrap_or_else(|| {
            warn!(status = %model.status, "unknown transaction status from server");
            TransactionStatus::Pending
        });
        Self {
            network_id: model.network_id.clone(),
            from_address_id: model.from_address_id.clone(),
            to_address_id: model.to_address_id.clone(),
            unsigned_payload: model.unsigned_payload.clone(),
            signed_payload: model.signed_payload.clone(),
            transaction_hash: model.transaction_hash.clone(),
            transaction_link: model.transaction_link.clone(),
            status,
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn from_address_id(&self) -> &str {
        &self.from_address_id
    }

    pub fn to_address_id(&self) -> Option<&str> {
        self.to_address_id.as_deref()
    }

    pub fn unsigned_payload(&self) -> &str {
        &self.unsigned_payload
    }

    /// Signed payload, present only after local signing (prefix stripped)
    pub fn signed_payload(&self) -> Option<&str> {
        self.signed_payload.as_deref()
    }

    /// Transaction hash, present only after broadcast
    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    /// Block-explorer link for this transaction, when the server provides one
    pub fn transaction_link(&self) -> Option<&str> {
        self.transaction_link.as_deref()
    }

    /// Locally cached status. Never re-queries; refresh via the owning
    /// operation's `reload`.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_signed(&self) -> bool {
        self.signed_payload.is_some()
    }

    /// Decode the unsigned payload and sign it with the given signer.
    ///
    /// The signer returns the raw signed transaction as 0x-prefixed hex; the
    /// prefix is stripped before the payload is stored for transmission.
    pub async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        let request = decode_unsigned_payload(&self.unsigned_payload)?;
        let signed = signer.sign_transaction(&request).await?;
        let stripped = signed.strip_prefix("0x").unwrap_or(&signed);
        if stripped.is_empty() {
            return Err(Error::Signing("signer returned an empty payload".to_string()));
        }
        self.signed_payload = Some(stripped.to_string());
        Ok(())
    }

    /// Refresh from a reloaded server model.
    ///
    /// Terminal states absorb: a reload never moves an envelope out of
    /// COMPLETE or FAILED.
    pub fn update_from(&mut self, model: &TransactionModel) {
        if self.status.is_terminal() {
            debug!(status = ?self.status, "ignoring reload of terminal envelope");
            return;
        }
        if let Some(signed) = &model.signed_payload {
            self.signed_payload = Some(signed.clone());
        }
        if let Some(hash) = &model.transaction_hash {
            self.transaction_hash = Some(hash.clone());
        }
        if let Some(link) = &model.transaction_link {
            self.transaction_link = Some(link.clone());
        }
        match TransactionStatus::parse(&model.status) {
            Some(status) => self.status = status,
            None => warn!(status = %model.status, "unknown transaction status from server"),
        }
    }
}
