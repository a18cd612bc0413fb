//! Staking context: stakeable/unstakeable/claimable balances and pre-flight
//! validation for stake, unstake, and claim requests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::models::StakingContextRequest;
use crate::api::LedgerApi;
use crate::assets::resolve_primary_asset_id;
use crate::balance::whole_amount;
use crate::error::{Error, Result};

/// How stake is delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingMode {
    Default,
    Partial,
    Native,
}

impl StakingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StakingMode::Default => "default",
            StakingMode::Partial => "partial",
            StakingMode::Native => "native",
        }
    }
}

impl fmt::Display for StakingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a staking operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingAction {
    Stake,
    Unstake,
    Claim,
}

impl StakingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StakingAction::Stake => "stake",
            StakingAction::Unstake => "unstake",
            StakingAction::Claim => "claim",
        }
    }
}

impl fmt::Display for StakingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-unit staking balances for an address/asset/mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakingBalances {
    pub stakeable: Decimal,
    pub unstakeable: Decimal,
    pub claimable: Decimal,
}

/// Queries the platform's staking context and validates requested amounts
/// against it before an operation is created.
pub struct StakingContext {
    api: Arc<dyn LedgerApi>,
    network_id: String,
}

impl StakingContext {
    pub fn new(api: Arc<dyn LedgerApi>, network_id: &str) -> Self {
        Self {
            api,
            network_id: network_id.to_string(),
        }
    }

    /// One context query, all three balances converted to whole units.
    pub async fn get_balances(
        &self,
        address_id: &str,
        asset_id: &str,
        mode: StakingMode,
        options: &BTreeMap<String, String>,
    ) -> Result<StakingBalances> {
        let request = StakingContextRequest {
            network_id: self.network_id.clone(),
            address_id: address_id.to_string(),
            asset_id: resolve_primary_asset_id(asset_id),
            mode: mode.as_str().to_string(),
            options: options.clone(),
        };
        let context = self.api.get_staking_context(&request).await?;
        Ok(StakingBalances {
            stakeable: whole_amount(&context.stakeable_balance)?,
            unstakeable: whole_amount(&context.unstakeable_balance)?,
            claimable: whole_amount(&context.claimable_balance)?,
        })
    }

    /// Check that `amount` can be staked right now.
    pub async fn validate_can_stake(
        &self,
        amount: Decimal,
        address_id: &str,
        asset_id: &str,
        mode: StakingMode,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        let balances = self
            .get_balances(address_id, asset_id, mode, options)
            .await?;
        ensure_available(amount, balances.stakeable)
    }

    /// Check that `amount` can be unstaked right now.
    pub async fn validate_can_unstake(
        &self,
        amount: Decimal,
        address_id: &str,
        asset_id: &str,
        mode: StakingMode,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        let balances = self
            .get_balances(address_id, asset_id, mode, options)
            .await?;
        ensure_available(amount, balances.unstakeable)
    }

    /// Check that `amount` of rewards can be claimed right now.
    ///
    /// Claiming the base network asset under native staking is categorically
    /// unsupported; that case fails before any balance is fetched.
    pub async fn validate_can_claim(
        &self,
        amount: Decimal,
        address_id: &str,
        asset_id: &str,
        mode: StakingMode,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        if mode == StakingMode::Native && resolve_primary_asset_id(asset_id) == "eth" {
            return Err(Error::InvalidArgument(
                "claiming stake is not supported for eth in native staking mode".to_string(),
            ));
        }
        let balances = self
            .get_balances(address_id, asset_id, mode, options)
            .await?;
        ensure_available(amount, balances.claimable)
    }
}

fn ensure_available(requested: Decimal, available: Decimal) -> Result<()> {
    if requested > available {
        return Err(Error::InsufficientFunds {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::api::models::StakingContextModel;
    use crate::api::testing::{balance_model, MockLedgerApi};

    fn context_with(stakeable: &str, unstakeable: &str, claimable: &str) -> StakingContext {
        let api = MockLedgerApi::default();
        *api.staking_context.lock().unwrap() = Some(StakingContextModel {
            stakeable_balance: balance_model("eth", 18, stakeable),
            unstakeable_balance: balance_model("eth", 18, unstakeable),
            claimable_balance: balance_model("eth", 18, claimable),
        });
        StakingContext::new(Arc::new(api), "base-sepolia")
    }

    fn no_options() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[tokio::test]
    async fn test_get_balances_converts_all_three() {
        let context = context_with(
            "2000000000000000000",
            "1000000000000000000",
            "500000000000000000",
        );
        let balances = context
            .get_balances("a-1", "eth", StakingMode::Partial, &no_options())
            .await
            .unwrap();
        assert_eq!(balances.stakeable, Decimal::from_str("2").unwrap());
        assert_eq!(balances.unstakeable, Decimal::from_str("1").unwrap());
        assert_eq!(balances.claimable, Decimal::from_str("0.5").unwrap());
    }

    #[tokio::test]
    async fn test_validate_can_stake_within_balance() {
        let context = context_with("2000000000000000000", "0", "0");
        context
            .validate_can_stake(
                Decimal::from_str("1.5").unwrap(),
                "a-1",
                "eth",
                StakingMode::Partial,
                &no_options(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validate_can_stake_over_balance() {
        let context = context_with("2000000000000000000", "0", "0");
        let err = context
            .validate_can_stake(
                Decimal::from_str("2.5").unwrap(),
                "a-1",
                "eth",
                StakingMode::Partial,
                &no_options(),
            )
            .await
            .unwrap_err();
        match err {
            Error::InsufficientFunds {
                requested,
                available,
            } => {
                assert_eq!(requested, Decimal::from_str("2.5").unwrap());
                assert_eq!(available, Decimal::from_str("2").unwrap());
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_can_unstake_uses_unstakeable_balance() {
        let context = context_with("0", "1000000000000000000", "0");
        let err = context
            .validate_can_unstake(
                Decimal::from_str("1.1").unwrap(),
                "a-1",
                "eth",
                StakingMode::Partial,
                &no_options(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_native_eth_claim_unsupported_without_balance_check() {
        // no staking context is scripted: the failure must come first
        let api = MockLedgerApi::default();
        let context = StakingContext::new(Arc::new(api), "base-sepolia");
        let err = context
            .validate_can_claim(
                Decimal::ONE,
                "a-1",
                "eth",
                StakingMode::Native,
                &no_options(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_gwei_alias_also_blocked_for_native_claim() {
        let api = MockLedgerApi::default();
        let context = StakingContext::new(Arc::new(api), "base-sepolia");
        let err = context
            .validate_can_claim(
                Decimal::ONE,
                "a-1",
                "gwei",
                StakingMode::Native,
                &no_options(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_claim_allowed_in_partial_mode() {
        let context = context_with("0", "0", "500000000000000000");
        context
            .validate_can_claim(
                Decimal::from_str("0.5").unwrap(),
                "a-1",
                "eth",
                StakingMode::Partial,
                &no_options(),
            )
            .await
            .unwrap();
    }
}
