//! Trades converting one asset into another on the same address

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

/// Human-readable trade parameters.
#[derive(Debug, Clone)]
pub struct TradeParams {
    /// Amount of the source asset, in whole units
    pub amount: Decimal,
    pub from_asset_id: String,
    pub to_asset_id: String,
}

/// A trade operation.
///
/// A trade may carry two envelopes: an ERC-20 approval followed by the swap
/// itself. Both are signed and broadcast in order.
#[derive(Debug)]
pub struct Trade {
    core: OperationCore,
    from_asset: Asset,
    to_asset: Asset,
    amount: Decimal,
    to_amount: Option<Decimal>,
}

impl Trade {
    /// Create a trade server-side, after checking the source-asset balance.
    pub async fn create(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: TradeParams,
    ) -> Result<Self> {
        if params.from_asset_id.eq_ignore_ascii_case(&params.to_asset_id) {
            return Err(Error::InvalidArgument(
                "cannot trade an asset for itself".to_string(),
            ));
        }
        let from_asset = Asset::resolve(network_id, &params.from_asset_id)?;
        let to_asset = Asset::resolve(network_id, &params.to_asset_id)?;
        let atomic = from_asset.to_atomic(params.amount)?;

        let scope = BalanceScope::Address {
            wallet_id: wallet_id.to_string(),
            address_id: address_id.to_string(),
        };
        let available = BalanceAggregator::new(api.clone())
            .get_balance(&scope, from_asset.asset_id())
            .await?;
        if params.amount > available {
            return Err(Error::InsufficientFunds {
                requested: params.amount,
                available,
            });
        }

        let mut request = CreateOperationRequest::new(
            OperationKind::Trade,
            network_id,
            &from_asset.primary_asset_id(),
            &atomic.to_str_radix(10),
        );
        request.to_asset_id = Some(to_asset.primary_asset_id());

        let model = api.create_operation(wallet_id, address_id, &request).await?;
        info!(operation_id = %model.operation_id, amount = %params.amount,
              from = %from_asset.asset_id(), to = %to_asset.asset_id(), "trade created");
        Self::from_model(api, &model)
    }

    /// Rehydrate a trade from a server model.
    pub fn from_model(api: Arc<dyn LedgerApi>, model: &OperationModel) -> Result<Self> {
        let from_asset_id = model
            .from_asset_id
            .as_deref()
            .or(model.asset_id.as_deref())
            .ok_or_else(|| Error::MalformedResponse("trade without source asset".to_string()))?;
        let to_asset_id = model
            .to_asset_id
            .as_deref()
            .ok_or_else(|| Error::MalformedResponse("trade without target asset".to_string()))?;
        let from_asset = Asset::resolve(&model.network_id, from_asset_id)?;
        let to_asset = Asset::resolve(&model.network_id, to_asset_id)?;

        let atomic_str = model
            .amount
            .as_deref()
            .ok_or_else(|| Error::MalformedResponse("trade without amount".to_string()))?;
        let amount = from_asset.from_atomic(&Asset::parse_atomic(atomic_str)?)?;
        let to_amount = match model.to_amount.as_deref() {
            Some(raw) => Some(to_asset.from_atomic(&Asset::parse_atomic(raw)?)?),
            None => None,
        };

        Ok(Self {
            core: OperationCore::new(api, model),
            from_asset,
            to_asset,
            amount,
            to_amount,
        })
    }

    /// Create, optionally sign and broadcast, and poll until terminal.
    pub async fn execute(
        api: Arc<dyn LedgerApi>,
        wallet_id: &str,
        address_id: &str,
        network_id: &str,
        params: TradeParams,
        signer: Option<&dyn TransactionSigner>,
        options: WaitOptions,
    ) -> Result<Self> {
        let trade = Self::create(api, wallet_id, address_id, network_id, params).await?;
        run_to_terminal(trade, signer, options).await
    }

    pub fn operation_id(&self) -> &str {
        self.core.operation_id()
    }

    pub fn from_asset(&self) -> &Asset {
        &self.from_asset
    }

    pub fn to_asset(&self) -> &Asset {
        &self.to_asset
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Amount of the target asset received, once the server reports it
    pub fn received_amount(&self) -> Option<Decimal> {
        self.to_amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.core.status()
    }

    /// Hash of the swap transaction (the last envelope)
    pub fn transaction_hash(&self) -> Option<&str> {
        self.core.envelopes().last().and_then(|e| e.transaction_hash())
    }

    pub fn transaction_link(&self) -> Option<&str> {
        self.core.envelopes().last().and_then(|e| e.transaction_link())
    }
}

#[async_trait]
impl ManagedOperation for Trade {
    async fn reload(&mut self) -> Result<()> {
        let model = self.core.reload().await?;
        if let Some(raw) = model.to_amount.as_deref() {
            self.to_amount = Some(self.to_asset.from_atomic(&Asset::parse_atomic(raw)?)?);
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.core.is_terminal()
    }
}

#[async_trait]
impl Broadcastable for Trade {
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()> {
        self.core.sign_all(signer).await
    }

    async fn broadcast(&mut self) -> Result<()> {
        self.core.broadcast_all().await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::api::testing::{balance_model, operation_model, MockLedgerApi};
    use crate::tx::payload::TransactionRequest;

    struct FixedSigner;

    #[async_trait]
    impl TransactionSigner for FixedSigner {
        async fn sign_transaction(&self, _request: &TransactionRequest) -> Result<String> {
            Ok("0xsignedtrade".to_string())
        }
    }

    fn params() -> TradeParams {
        TradeParams {
            amount: Decimal::from_str("0.5").unwrap(),
            from_asset_id: "eth".to_string(),
            to_asset_id: "usdc".to_string(),
        }
    }

    fn funded_mock() -> MockLedgerApi {
        let api = MockLedgerApi::default();
        api.set_balance("eth", balance_model("eth", 18, "1000000000000000000"));
        api
    }

    #[tokio::test]
    async fn test_create_carries_both_legs() {
        let api = funded_mock();
        *api.create_response.lock().unwrap() =
            Some(operation_model(OperationKind::Trade, &["pending"]));
        let api = Arc::new(api);

        let trade = Trade::create(api.clone(), "w-1", "a-1", "base-sepolia", params())
            .await
            .unwrap();

        let request = api.last_create_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.asset_id, "eth");
        assert_eq!(request.to_asset_id.as_deref(), Some("usdc"));
        assert_eq!(request.amount, "500000000000000000");
        assert_eq!(trade.to_asset().asset_id(), "usdc");
    }

    #[tokio::test]
    async fn test_self_trade_rejected() {
        let api = Arc::new(funded_mock());
        let err = Trade::create(
            api.clone(),
            "w-1",
            "a-1",
            "base-sepolia",
            TradeParams {
                amount: Decimal::ONE,
                from_asset_id: "eth".to_string(),
                to_asset_id: "ETH".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_insufficient_source_balance_rejected() {
        let api = MockLedgerApi::default();
        // no eth balance on record at all: available resolves to zero
        let api = Arc::new(api);
        let err = Trade::create(api.clone(), "w-1", "a-1", "base-sepolia", params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trade_with_approval_broadcasts_both_envelopes() {
        let api = funded_mock();
        *api.create_response.lock().unwrap() = Some(operation_model(
            OperationKind::Trade,
            &["pending", "pending"],
        ));
        *api.broadcast_response.lock().unwrap() = Some(operation_model(
            OperationKind::Trade,
            &["broadcast", "broadcast"],
        ));
        api.push_reload(operation_model(
            OperationKind::Trade,
            &["complete", "complete"],
        ));
        let api = Arc::new(api);

        let trade = Trade::execute(
            api.clone(),
            "w-1",
            "a-1",
            "base-sepolia",
            params(),
            Some(&FixedSigner),
            WaitOptions::new(Duration::from_millis(1), Duration::from_secs(1)),
        )
        .await
        .unwrap();

        assert_eq!(trade.status(), TransactionStatus::Complete);
        // one broadcast request per envelope, in index order
        assert_eq!(api.broadcast_calls.load(Ordering::SeqCst), 2);
        let last = api.last_broadcast_request.lock().unwrap().clone().unwrap();
        assert_eq!(last.transaction_index, 1);
        // the filled target amount came back with the reload
        assert_eq!(trade.received_amount(), Some(Decimal::from_str("5").unwrap()));
    }
}
