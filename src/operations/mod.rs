//! Operation kinds and the state they share
//!
//! Transfer, trade, contract invocation, staking, and deployment all reduce
//! to the same lifecycle; `OperationCore` carries the pieces every kind
//! needs (API handle, ids, envelopes) so each kind only adds its own
//! request/response shape on top.

pub mod deploy;
pub mod invocation;
pub mod stake;
pub mod trade;
pub mod transfer;

use std::sync::Arc;

use tracing::{debug, warn};

pub use deploy::{DeploymentParams, SmartContractDeployment};
pub use invocation::{ContractInvocation, InvocationParams};
pub use stake::{StakingOperation, StakingOperationParams};
pub use trade::{Trade, TradeParams};
pub use transfer::{Transfer, TransferParams};

use crate::api::models::{BroadcastRequest, OperationKind, OperationModel};
use crate::api::LedgerApi;
use crate::error::{Error, Result};
use crate::tx::envelope::{TransactionEnvelope, TransactionStatus};
use crate::tx::signer::TransactionSigner;

/// Safety cap when draining cursor-paginated listings.
pub(crate) const MAX_LIST_ITEMS: usize = 1000;

/// Roll per-envelope statuses up to one operation-level status.
///
/// Zero envelopes is a successful no-op (e.g. a claim below the dust
/// threshold), not an error.
pub(crate) fn aggregate_status(envelopes: &[TransactionEnvelope]) -> TransactionStatus {
    if envelopes.is_empty() {
        return TransactionStatus::Complete;
    }
    if envelopes
        .iter()
        .any(|e| e.status() == TransactionStatus::Failed)
    {
        TransactionStatus::Failed
    } else if envelopes
        .iter()
        .all(|e| e.status() == TransactionStatus::Complete)
    {
        TransactionStatus::Complete
    } else if envelopes
        .iter()
        .any(|e| e.status() == TransactionStatus::Broadcast)
    {
        TransactionStatus::Broadcast
    } else {
        TransactionStatus::Pending
    }
}

/// State shared by every operation kind.
pub(crate) struct OperationCore {
    api: Arc<dyn LedgerApi>,
    wallet_id: String,
    address_id: String,
    operation_id: String,
    envelopes: Vec<TransactionEnvelope>,
}

impl std::fmt::Debug for OperationCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCore")
            .field("wallet_id", &self.wallet_id)
            .field("address_id", &self.address_id)
            .field("operation_id", &self.operation_id)
            .field("envelopes", &self.envelopes)
            .finish_non_exhaustive()
    }
}

impl OperationCore {
    pub(crate) fn new(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Self {
        Self {
            api,
            wallet_id: model.wallet_id.clone(),
            address_id: model.address_id.clone(),
            operation_id: model.operation_id.clone(),
            envelopes: model
                .transactions
                .iter()
                .map(TransactionEnvelope::from_model)
                .collect(),
        }
    }

    pub(crate) fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub(crate) fn envelopes(&self) -> &[TransactionEnvelope] {
        &self.envelopes
    }

    pub(crate) fn status(&self) -> TransactionStatus {
        aggregate_status(&self.envelopes)
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.envelopes.iter().all(|e| e.is_terminal())
    }

    /// Fetch the current server model and refresh the envelopes from it.
    ///
    /// Returns the model so kind-specific fields can be read by the caller.
    pub(crate) async fn reload(&mut self) -> Result<OperationModel> {
        let model = self
            .api
            .get_operation(&self.wallet_id, &self.address_id, &self.operation_id)
            .await?;
        self.update_from(&model);
        Ok(model)
    }

    /// Refresh envelopes from a server model, index-aligned.
    ///
    /// Staking operations can materialize additional transactions
    /// server-side; envelopes the server reports beyond the known ones are
    /// appended.
    pub(crate) fn update_from(&mut self, model: &OperationModel) {
        for (index, transaction) in model.transactions.iter().enumerate() {
            match self.envelopes.get_mut(index) {
                Some(envelope) => envelope.update_from(transaction),
                None => self
                    .envelopes
                    .push(TransactionEnvelope::from_model(transaction)),
            }
        }
    }

    /// Sign every not-yet-signed envelope with the given signer.
    pub(crate) async fn sign_all(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        futures::future::try_join_all(
            self.envelopes
                .iter_mut()
                .filter(|envelope| !envelope.is_signed())
                .map(|envelope| envelope.sign(signer)),
        )
        .await?;
        Ok(())
    }

    /// Broadcast every signed envelope, one request per transaction.
    ///
    /// Zero envelopes is a successful no-op: the operation is already
    /// complete and nothing is submitted.
    pub(crate) async fn broadcast_all(&mut self) -> Result<()> {
        if self.envelopes.is_empty() {
            debug!(
                operation_id = %self.operation_id,
                "broadcast with zero transactions, nothing to submit"
            );
            return Ok(());
        }
        for index in 0..self.envelopes.len() {
            // an unsigned envelope at broadcast time means no local signer
            // produced a payload; that is fatal, not retryable
            let signed = self.envelopes[index]
                .signed_payload()
                .ok_or(Error::NoSigner)?
                .to_string();
            let request = BroadcastRequest {
                signed_payload: signed,
                transaction_index: index,
            };
            let model = self
                .api
                .broadcast_operation(
                    &self.wallet_id,
                    &self.address_id,
                    &self.operation_id,
                    &request,
                )
                .await?;
            self.update_from(&model);
        }
        Ok(())
    }
}

/// Any operation kind, as returned by listings.
pub enum Operation {
    Transfer(Transfer),
    Trade(Trade),
    ContractInvocation(ContractInvocation),
    StakingOperation(StakingOperation),
    SmartContractDeployment(SmartContractDeployment),
}

impl Operation {
    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        Ok(match model.kind {
            OperationKind::Transfer => Operation::Transfer(Transfer::from_model(api, model)?),
            OperationKind::Trade => Operation::Trade(Trade::from_model(api, model)?),
            OperationKind::ContractInvocation => {
                Operation::ContractInvocation(ContractInvocation::from_model(api, model)?)
            }
            OperationKind::StakingOperation => {
                Operation::StakingOperation(StakingOperation::from_model(api, model)?)
            }
            OperationKind::SmartContractDeployment => {
                Operation::SmartContractDeployment(SmartContractDeployment::from_model(api, model)?)
            }
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Transfer(_) => OperationKind::Transfer,
            Operation::Trade(_) => OperationKind::Trade,
            Operation::ContractInvocation(_) => OperationKind::ContractInvocation,
            Operation::StakingOperation(_) => OperationKind::StakingOperation,
            Operation::SmartContractDeployment(_) => OperationKind::SmartContractDeployment,
        }
    }

    pub fn operation_id(&self) -> &str {
        match self {
            Operation::Transfer(op) => op.operation_id(),
            Operation::Trade(op) => op.operation_id(),
            Operation::ContractInvocation(op) => op.operation_id(),
            Operation::StakingOperation(op) => op.operation_id(),
            Operation::SmartContractDeployment(op) => op.operation_id(),
        }
    }

    pub fn status(&self) -> TransactionStatus {
        match self {
            Operation::Transfer(op) => op.status(),
            Operation::Trade(op) => op.status(),
            Operation::ContractInvocation(op) => op.status(),
            Operation::StakingOperation(op) => op.status(),
            Operation::SmartContractDeployment(op) => op.status(),
        }
    }
}

/// Drain the operation listing for an address, following cursor tokens.
///
/// Stops at `MAX_LIST_ITEMS` as a safety cap against unbounded histories.
pub async fn list_operations(
    api: Arc<dyn LedgerApi>,
    wallet_id: &str,
    address_id: &str,
    page_size: u32,
) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = api
            .list_operations(wallet_id, address_id, page_size, page_token.as_deref())
            .await?;
        for model in &page.data {
            operations.push(Operation::from_model(api.clone(), model)?);
            if operations.len() >= MAX_LIST_ITEMS {
                warn!(cap = MAX_LIST_ITEMS, "operation listing hit safety cap");
                return Ok(operations);
            }
        }
        page_token = page.next_page.filter(|_| page.has_more);
        if page_token.is_none() {
            break;
        }
    }

    Ok(operations)
}
