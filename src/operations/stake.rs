//! Staking operations: stake, unstake, and claim
//!
//! A staking operation may bundle several transactions (e.g. approve +
//! deposit), and the server may report zero transactions when every
//! sub-step was a no-op - that case completes successfully.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::models::{CreateOperationRequest, OperationKind, OperationModel};
use crate::api::LedgerApi;
use crate::assets::Asset;
use crate::error::{Error, Result};
use crate::lifecycle::{run_to_terminal, Broadcastable, ManagedOperation, WaitOptions};
use crate::operations::OperationCore;
use crate::staking::{StakingAction, StakingContext, StakingMode};
use crate::tx::envelope::{TransactionEnvelope, TransactionStatus};
use crate::tx::signer::TransactionSigner;

/// Human-readable staking parameters.
#[derive(Debug, Clone)]
pub struct StakingOperationParams {
    pub action: StakingAction,
    /// Amount in whole units of the asset
    pub amount: Decimal,
    pub asset_id: String,
    pub mode: StakingMode,
    /// Provider-specific options forwarded with the context query
    pub options: BTreeMap<String, String>,
}

/// A staking operation owning zero or more transaction envelopes.
#[derive(Debug)]
pub struct StakingOperation {
    core: OperationCore,
    action: StakingAction,
    mode: StakingMode,
}

impl StakingOperation {
    /// Create a staking operation server-side.
    ///
    /// The requested amount is validated against the staking context first
    /// (stakeable, unstakeable, or claimable balance depending on the
    /// action), so an impossible request fails locally.
    pub async fn create(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: StakingOperationParams,
    ) -> Result<Self> {
        let asset = Asset::resolve(network_id, &params.asset_id)?;
        let atomic = asset.to_atomic(params.amount)?;

        let context = StakingContext::new(api.clone(), network_id);
        match params.action {
            StakingAction::Stake => {
                context
                    .validate_can_stake(
                        params.amount,
                        address_id,
                        &params.asset_id,
                        params.mode,
                        &params.options,
                    )
                    .await?
            }
            StakingAction::Unstake => {
                context
                    .validate_can_unstake(
                        params.amount,
                        address_id,
                        &params.asset_id,
                        params.mode,
                        &params.options,
                    )
                    .await?
            }
            StakingAction::Claim => {
                context
                    .validate_can_claim(
                        params.amount,
                        address_id,
                        &params.asset_id,
                        params.mode,
                        &params.options,
                    )
                    .await?
            }
        }

        let mut request = CreateOperationRequest::new(
            OperationKind::StakingOperation,
            network_id,
            &asset.primary_asset_id(),
            &atomic.to_str_radix(10),
        );
        request.staking_action = Some(params.action.as_str().to_string());
        request.staking_mode = Some(params.mode.as_str().to_string());

        let model = api.create_operation(wallet_id, address_id, &request).await?;
        info!(operation_id = %model.operation_id, action = %params.action,
              mode = %params.mode, amount = %params.amount, "staking operation created");
        Self::from_model(api, &model)
    }

    /// Rehydrate a staking operation from a server model.
    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        let action = match model.staking_action.as_deref() {
            Some("stake") => StakingAction::Stake,
            Some("unstake") => StakingAction::Unstake,
            Some("claim") => StakingAction::Claim,
            other => {
                return Err(Error::MalformedResponse(format!(
                    "staking operation with unknown action {other:?}"
                )))
            }
        };
        let mode = match model.staking_mode.as_deref() {
            Some("default") | None => StakingMode::Default,
            Some("partial") => StakingMode::Partial,
            Some("native") => StakingMode::Native,
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "staking operation with unknown mode {other:?}"
                )))
            }
        };
        Ok(Self {
            core: OperationCore::new(api, model),
            action,
            mode,
        })
    }

    /// Create, optionally sign and broadcast, and poll until terminal.
    pub async fn execute(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: StakingOperationParams,
        signer: Option<&dyn TransactionSigner>,
        options: WaitOptions,
    ) -> Result<Self> {
        let operation = Self::create(api, wallet_id, address_id, network_id, params).await?;
        run_to_terminal(operation, signer, options).await
    }

    pub fn operation_id(&self) -> &str {
        self.core.operation_id()
    }

    pub fn action(&self) -> StakingAction {
        self.action
    }

    pub fn mode(&self) -> StakingMode {
        self.mode
    }

    pub fn envelopes(&self) -> &[TransactionEnvelope] {
        self.core.envelopes()
    }

    pub fn status(&self) -> TransactionStatus {
        self.core.status()
    }

    /// Hashes of every broadcast transaction in the bundle
    pub fn transaction_hashes(&self) -> Vec<&str> {
        self.core
            .envelopes()
            .iter()
            .filter_map(|e| e.transaction_hash())
            .collect()
    }

    /// Explorer links for every transaction the server annotated
    pub fn transaction_links(&self) -> Vec<&str> {
        self.core
            .envelopes()
            .iter()
            .filter_map(|e| e.transaction_link())
            .collect()
    }
}

#[async_trait]
impl ManagedOperation for StakingOperation {
    async fn reload(&mut self) -> Result<()> {
        self.core.reload().await?;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.core.is_terminal()
    }
}

#[async_trait]
impl Broadcastable for StakingOperation {
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        self.core.sign_all(signer).await
    }

    async fn broadcast(&mut self) -> Result<()> {
        self.core.broadcast_all().await
    }
}
