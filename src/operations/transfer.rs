//! Transfers of an asset from one address to another

use std::sync::Arc;

use async_trait::async_trait;
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

/// Human-readable transfer parameters.
#[derive(Debug, Clone)]
pub struct TransferParams {
    /// Amount in whole units of the asset
    pub amount: Decimal,
    pub asset_id: String,
    pub destination: String,
}

/// A transfer operation owning a single transaction envelope.
#[derive(Debug)]
pub struct Transfer {
    core: OperationCore,
    asset: Asset,
    amount: Decimal,
    destination: String,
}

impl Transfer {
    /// Create a transfer server-side.
    ///
    /// The amount is converted to atomic units and the asset id resolved to
    /// its primary denomination before the request is built. The available
    /// balance is checked first so an obviously underfunded transfer fails
    /// locally instead of costing a round trip; the server remains the final
    /// authority.
    pub async fn create(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: TransferParams,
    ) -> Result<Self> {
        let asset = Asset::resolve(network_id, &params.asset_id)?;
        let atomic = asset.to_atomic(params.amount)?;

        let scope = BalanceScope::Address {
            wallet_id: wallet_id.to_string(),
            address_id: address_id.to_string(),
        };
        let available = BalanceAggregator::new(api.clone())
            .get_balance(&scope, asset.asset_id())
            .await?;
        if params.amount > available {
            return Err(Error::InsufficientFunds {
                requested: params.amount,
                available,
            });
        }

        let mut request = CreateOperationRequest::new(
            OperationKind::Transfer,
            network_id,
            &asset.primary_asset_id(),
            &atomic.to_str_radix(10),
        );
        request.destination = Some(params.destination.clone());

        let model = api.create_operation(wallet_id, address_id, &request).await?;
        info!(operation_id = %model.operation_id, amount = %params.amount,
              asset = %asset.asset_id(), "transfer created");
        Self::from_model(api, &model)
    }

    /// Rehydrate a transfer from a server model.
    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        let asset_id = model
            .asset_id
            .as_deref()
            .ok_or_else(|| Error::MalformedResponse("transfer without asset id".to_string()))?;
        let asset = Asset::resolve(&model.network_id, asset_id)?;
        let atomic_str = model
            .amount
            .as_deref()
            .ok_or_else(|| Error::MalformedResponse("transfer without amount".to_string()))?;
        let amount = asset.from_atomic(&Asset::parse_atomic(atomic_str)?)?;
        let destination = model
            .destination
            .clone()
            .ok_or_else(|| Error::MalformedResponse("transfer without destination".to_string()))?;

        Ok(Self {
            core: OperationCore::new(api, model),
            asset,
            amount,
            destination,
        })
    }

    /// Create, optionally sign and broadcast, and poll until terminal.
    pub async fn execute(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: TransferParams,
        signer: Option<&dyn TransactionSigner>,
        options: WaitOptions,
    ) -> Result<Self> {
        let transfer = Self::create(api, wallet_id, address_id, network_id, params).await?;
        run_to_terminal(transfer, signer, options).await
    }

    pub fn operation_id(&self) -> &str {
        self.core.operation_id()
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn destination(&self) -> &str {
        &self.destination
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

    pub fn is_signed(&self) -> bool {
        self.core.envelopes().iter().all(|e| e.is_signed())
    }
}

#[async_trait]
impl ManagedOperation for Transfer {
    async fn reload(&mut self) -> Result<()> {
        self.core.reload().await?;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.core.is_terminal()
    }
}

#[async_trait]
impl Broadcastable for Transfer {
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        self.core.sign_all(signer).await
    }

    async fn broadcast(&mut self) -> Result<()> {
        self.core.broadcast_all().await
    }
}
