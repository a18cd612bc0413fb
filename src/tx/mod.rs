//! Transaction payload decoding, signing, and envelope state

pub mod envelope;
pub mod payload;
pub mod signer;

pub use envelope::{TransactionEnvelope, TransactionStatus};
pub use payload::{decode_unsigned_payload, TransactionRequest};
pub use signer::TransactionSigner;
