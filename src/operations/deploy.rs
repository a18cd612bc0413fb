//! Smart-contract deployments

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::api::models::{CreateOperationRequest, OperationKind, OperationModel};
use crate::api::LedgerApi;
use crate::error::Result;
use crate::lifecycle::{run_to_terminal, Broadcastable, ManagedOperation, WaitOptions};
use crate::operations::OperationCore;
use crate::tx::envelope::TransactionStatus;
use crate::tx::signer::TransactionSigner;

/// Parameters for deploying a contract.
#[derive(Debug, Clone)]
pub struct DeploymentParams {
    /// Compiled contract bytecode, hex-encoded
    pub data: String,
    /// Constructor arguments, serialized as the platform expects them
    pub constructor_args: Option<serde_json::Value>,
}

/// A contract deployment operation. Its envelope carries no destination;
/// the contract address appears on the model once the deployment confirms.
pub struct SmartContractDeployment {
    core: OperationCore,
    contract_address: Option<String>,
}

impl SmartContractDeployment {
    pub async fn create(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: DeploymentParams,
    ) -> Result<Self> {
        let mut request = CreateOperationRequest::new(
            OperationKind::SmartContractDeployment,
            network_id,
            "eth",
            "0",
        );
        request.data = Some(params.data.clone());
        request.args = params.constructor_args.clone();

        let model = api.create_operation(wallet_id, address_id, &request).await?;
        info!(operation_id = %model.operation_id, "contract deployment created");
        Self::from_model(api, &model)
    }

    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        Ok(Self {
            core: OperationCore::new(api, model),
            contract_address: model.contract_address.clone(),
        })
    }

    /// Create, optionally sign and broadcast, and poll until terminal.
    pub async fn execute(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: DeploymentParams,
        signer: Option<&dyn TransactionSigner>,
        options: WaitOptions,
    ) -> Result<Self> {
        let deployment = Self::create(api, wallet_id, address_id, network_id, params).await?;
        run_to_terminal(deployment, signer, options).await
    }

    pub fn operation_id(&self) -> &str {
        self.core.operation_id()
    }

    /// Deployed contract address, once the server reports it
    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
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
impl ManagedOperation for SmartContractDeployment {
    async fn reload(&mut self) -> Result<()> {
        let model = self.core.reload().await?;
        if model.contract_address.is_some() {
            self.contract_address = model.contract_address;
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.core.is_terminal()
    }
}

#[async_trait]
impl Broadcastable for SmartContractDeployment {
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        self.core.sign_all(signer).await
    }

    async fn broadcast(&mut self) -> Result<()> {
        self.core.broadcast_all().await
    }
}
