//! Balance aggregation for wallets and addresses

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::api::models::BalanceModel;
use crate::api::{BalanceScope, LedgerApi};
use crate::assets::Asset;
use crate::error::Result;

/// Convert a wire balance to a whole-unit decimal via its asset's precision.
pub(crate) fn whole_amount(model: &BalanceModel) -> Result<Decimal> {
    let asset = Asset::new(
        &model.asset.network_id,
        &model.asset.asset_id,
        model.asset.decimals,
        model.asset.contract_address.clone(),
    )?;
    let atomic = Asset::parse_atomic(&model.amount)?;
    asset.from_atomic(&atomic)
}

/// Fetches per-asset balances and converts them to whole-unit decimals.
pub struct BalanceAggregator {
    api: Arc<dyn LedgerApi>,
}

impl BalanceAggregator {
    pub fn new(api: Arc<dyn LedgerApi>) -> Self {
        Self { api }
    }

    /// All balances in scope, keyed by lower-case asset id.
    ///
    /// Drains every page of the listing. Duplicate asset ids should not
    /// occur in a well-formed response; if they do, the last write wins.
    pub async fn list_balances(&self, scope: &BalanceScope) -> Result<BTreeMap<String, Decimal>> {
        let mut balances = BTreeMap::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.api.list_balances(scope, page_token.as_deref()).await?;
            for model in &page.data {
                let amount = whole_amount(model)?;
                balances.insert(model.asset.asset_id.to_lowercase(), amount);
            }
            page_token = page.next_page.filter(|_| page.has_more);
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = balances.len(), "aggregated balances");
        Ok(balances)
    }

    /// Balance for a single asset; zero when the server has no record.
    pub async fn get_balance(&self, scope: &BalanceScope, asset_id: &str) -> Result<Decimal> {
        match self.api.get_balance(scope, asset_id).await? {
            Some(model) => whole_amount(&model),
            None => Ok(Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::api::models::PageModel;
    use crate::api::testing::{balance_model, MockLedgerApi};
    use crate::error::Error;

    fn scope() -> BalanceScope {
        BalanceScope::Address {
            wallet_id: "w-1".to_string(),
            address_id: "a-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_balances_drains_pages() {
        let api = MockLedgerApi::default();
        api.balance_pages.lock().unwrap().push_back(PageModel {
            data: vec![balance_model("eth", 18, "500000000000000000")],
            has_more: true,
            next_page: Some("page-2".to_string()),
        });
        api.balance_pages.lock().unwrap().push_back(PageModel {
            data: vec![balance_model("usdc", 6, "5000000")],
            has_more: false,
            next_page: None,
        });

        let aggregator = BalanceAggregator::new(Arc::new(api));
        let balances = aggregator.list_balances(&scope()).await.unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances["eth"], Decimal::from_str("0.5").unwrap());
        assert_eq!(balances["usdc"], Decimal::from_str("5").unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_asset_last_write_wins() {
        let api = MockLedgerApi::default();
        api.balance_pages.lock().unwrap().push_back(PageModel {
            data: vec![
                balance_model("usdc", 6, "1000000"),
                balance_model("usdc", 6, "7000000"),
            ],
            has_more: false,
            next_page: None,
        });

        let aggregator = BalanceAggregator::new(Arc::new(api));
        let balances = aggregator.list_balances(&scope()).await.unwrap();
        assert_eq!(balances["usdc"], Decimal::from_str("7").unwrap());
    }

    #[tokio::test]
    async fn test_get_balance() {
        let api = MockLedgerApi::default();
        api.set_balance("eth", balance_model("eth", 18, "2000000000000000000"));

        let aggregator = BalanceAggregator::new(Arc::new(api));
        let balance = aggregator.get_balance(&scope(), "eth").await.unwrap();
        assert_eq!(balance, Decimal::from_str("2").unwrap());
    }

    #[tokio::test]
    async fn test_missing_balance_is_zero_not_error() {
        let aggregator = BalanceAggregator::new(Arc::new(MockLedgerApi::default()));
        let balance = aggregator.get_balance(&scope(), "usdc").await.unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_malformed_amount_surfaces() {
        let api = MockLedgerApi::default();
        api.set_balance("eth", balance_model("eth", 18, "2e21"));

        let aggregator = BalanceAggregator::new(Arc::new(api));
        let err = aggregator.get_balance(&scope(), "eth").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
