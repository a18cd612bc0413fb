//! Contract invocations: calling a method on a deployed contract

use std::sync::Arc;

use async_trait::async_trait;
use num_traits::Zero;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::models::{CreateOperationRequest, OperationKind, OperationModel};
use crate::api::{BalanceScope, LedgerApi};
use crate::assets::Asset;
use crate::balance::BalanceAggregator;
use crate::error::{Error, Result};
use crate::lifecycle::{run_to_terminal, Broadcastable, ManagedOperation, WaitOptions};
use crate::operations::OperationCore;
use crate::tx::envelope::TransactionStatus;
use crate::tx::signer::TransactionSigner;

/// Parameters for invoking a contract method.
#[derive(Debug, Clone)]
pub struct InvocationParams {
    pub contract_address: String,
    pub method: String,
    /// ABI arguments, serialized as the platform expects them
    pub args: serde_json::Value,
    /// Value to attach for payable methods, in whole units of `asset_id`
    pub amount: Option<Decimal>,
    /// Asset for the attached value; defaults to the network's base asset
    pub asset_id: Option<String>,
}

/// A contract invocation operation owning a single envelope.
#[derive(Debug)]
pub struct ContractInvocation {
    core: OperationCore,
    contract_address: String,
    method: String,
}

impl ContractInvocation {
    /// Create an invocation server-side.
    ///
    /// For payable calls the attached amount is balance-checked first, the
    /// same way a transfer is.
    pub async fn create(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: InvocationParams,
    ) -> Result<Self> {
        let asset_id = params.asset_id.as_deref().unwrap_or("eth");
        let asset = Asset::resolve(network_id, asset_id)?;
        let amount = params.amount.unwrap_or(Decimal::ZERO);
        let atomic = asset.to_atomic(amount)?;

        if !atomic.is_zero() {
            let scope = BalanceScope::Address {
                wallet_id: wallet_id.to_string(),
                address_id: address_id.to_string(),
            };
            let available = BalanceAggregator::new(api.clone())
                .get_balance(&scope, asset.asset_id())
                .await?;
            if amount > available {
                return Err(Error::InsufficientFunds {
                    requested: amount,
                    available,
                });
            }
        }

        let mut request = CreateOperationRequest::new(
            OperationKind::ContractInvocation,
            network_id,
            &asset.primary_asset_id(),
            &atomic.to_str_radix(10),
        );
        request.contract_address = Some(params.contract_address.clone());
        request.method = Some(params.method.clone());
        request.args = Some(params.args.clone());

        let model = api.create_operation(wallet_id, address_id, &request).await?;
        info!(operation_id = %model.operation_id, contract = %params.contract_address,
              method = %params.method, "contract invocation created");
        Self::from_model(api, &model)
    }

    /// Rehydrate an invocation from a server model.
    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        let contract_address = model.contract_address.clone().ok_or_else(|| {
            Error::MalformedResponse("contract invocation without contract address".to_string())
        })?;
        let method = model
            .method
            .clone()
            .ok_or_else(|| Error::MalformedResponse("contract invocation without method".to_string()))?;
        Ok(Self {
            core: OperationCore::new(api, model),
            contract_address,
            method,
        })
    }

    /// Create, optionally sign and broadcast, and poll until terminal.
    pub async fn execute(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: InvocationParams,
        signer: Option<&dyn TransactionSigner>,
        options: WaitOptions,
    ) -> Result<Self> {
        let invocation = Self::create(api, wallet_id, address_id, network_id, params).await?;
        run_to_terminal(invocation, signer, options).await
    }

    pub fn operation_id(&self) -> &str {
        self.core.operation_id()
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn status(&self) -> TransactionStatus {
        self.core.status()
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.core.envelopes().first().and_then(|e| e.transaction_hash())
    }

    pub fn transaction_link(&self) -> Option<&str> {
        self.core.envelopes().first().and_then(|e| e.transaction_link())
    }
}

#[async_trait]
impl ManagedOperation for ContractInvocation {
    async fn reload(&mut self) -> Result<()> {
        self.core.reload().await?;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.core.is_terminal()
    }
}

#[async_trait]
impl Broadcastable for ContractInvocation {
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        self.core.sign_all(signer).await
    }

    async fn broadcast(&mut self) -> Result<()> {
        self.core.broadcast_all().await
    }
}
