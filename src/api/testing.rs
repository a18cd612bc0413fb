//! Scriptable in-memory `LedgerApi` for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::models::{
    BalanceModel, BroadcastRequest, CreateOperationRequest, FaucetTransactionModel,
    OperationKind, OperationModel, PageModel, StakingContextModel, StakingContextRequest,
    TransactionModel,
};
use crate::api::{BalanceScope, LedgerApi};
use crate::error::{Error, Result};

/// Mock API: canned responses, call counters.
///
/// `reload_sequence` is consumed front to back; the final model keeps
/// repeating, which mirrors a server whose operation has settled.
#[derive(Default)]
pub struct MockLedgerApi {
    pub create_response: Mutex<Option<OperationModel>>,
    pub broadcast_response: Mutex<Option<OperationModel>>,
    pub reload_sequence: Mutex<VecDeque<OperationModel>>,
    pub operation_pages: Mutex<VecDeque<PageModel<OperationModel>>>,
    pub balance_pages: Mutex<VecDeque<PageModel<BalanceModel>>>,
    pub balances: Mutex<HashMap<String, BalanceModel>>,
    pub staking_context: Mutex<Option<StakingContextModel>>,
    pub create_calls: AtomicUsize,
    pub broadcast_calls: AtomicUsize,
    pub reload_calls: AtomicUsize,
    pub last_create_request: Mutex<Option<CreateOperationRequest>>,
    pub last_broadcast_request: Mutex<Option<BroadcastRequest>>,
}

fn missing(what: &str) -> Error {
    Error::Api {
        status: 500,
        code: "mock_unset".to_string(),
        message: format!("no scripted response for {what}"),
        correlation_id: "mock".to_string(),
    }
}

impl MockLedgerApi {
    pub fn push_reload(&self, model: OperationModel) {
        self.reload_sequence.lock().unwrap().push_back(model);
    }

    pub fn set_balance(&self, asset_id: &str, model: BalanceModel) {
        self.balances
            .lock()
            .unwrap()
            .insert(asset_id.to_string(), model);
    }
}

#[async_trait]
impl LedgerApi for MockLedgerApi {
    async fn create_operation(
        &self,
        _wallet_id: &str,
        _address_id: &str,
        request: &CreateOperationRequest,
    ) -> Result<OperationModel> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create_request.lock().unwrap() = Some(request.clone());
        self.create_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| missing("create_operation"))
    }

    async fn broadcast_operation(
        &self,
        _wallet_id: &str,
        _address_id: &str,
        _operation_id: &str,
        request: &BroadcastRequest,
    ) -> Result<OperationModel> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_broadcast_request.lock().unwrap() = Some(request.clone());
        self.broadcast_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| missing("broadcast_operation"))
    }

    async fn get_operation(
        &self,
        _wallet_id: &str,
        _address_id: &str,
        _operation_id: &str,
    ) -> Result<OperationModel> {
        self.reload_calls.fetch_add(1, Ordering::SeqCst);
        let mut sequence = self.reload_sequence.lock().unwrap();
        let model = sequence.pop_front().ok_or_else(|| missing("get_operation"))?;
        if sequence.is_empty() {
            sequence.push_back(model.clone());
        }
        Ok(model)
    }

    async fn list_operations(
        &self,
        _wallet_id: &str,
        _address_id: &str,
        _page_size: u32,
        _page_token: Option<&str>,
    ) -> Result<PageModel<OperationModel>> {
        self.operation_pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| missing("list_operations"))
    }

    async fn list_balances(
        &self,
        _scope: &BalanceScope,
        _page_token: Option<&str>,
    ) -> Result<PageModel<BalanceModel>> {
        self.balance_pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| missing("list_balances"))
    }

    async fn get_balance(
        &self,
        _scope: &BalanceScope,
        asset_id: &str,
    ) -> Result<Option<BalanceModel>> {
        Ok(self.balances.lock().unwrap().get(asset_id).cloned())
    }

    async fn get_staking_context(
        &self,
        _request: &StakingContextRequest,
    ) -> Result<StakingContextModel> {
        self.staking_context
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| missing("get_staking_context"))
    }

    async fn request_faucet_funds(
        &self,
        _wallet_id: &str,
        _address_id: &str,
        _asset_id: Option<&str>,
    ) -> Result<FaucetTransactionModel> {
        Ok(FaucetTransactionModel {
            transaction_hash: "0xfaucet".to_string(),
            transaction_link: None,
        })
    }
}

/// Unsigned payload for a 0.5 ETH transfer on base-sepolia.
pub fn unsigned_transfer_payload() -> String {
    let json = r#"{
        "chainId": "0x14a34",
        "nonce": "0x0",
        "gas": "0x5208",
        "maxPriorityFeePerGas": "0xf4240",
        "maxFeePerGas": "0x3b9aca00",
        "to": "0x4d9e4f3f4d1a8b5f4f7b1f1d5b9e4f3f4d1a8b5f",
        "value": "0x6f05b59d3b20000",
        "data": "0x"
    }"#;
    hex::encode(json.as_bytes())
}

pub fn transaction_model(status: &str) -> TransactionModel {
    TransactionModel {
        network_id: "base-sepolia".to_string(),
        from_address_id: "0xfrom".to_string(),
        to_address_id: Some("0x4d9e4f3f4d1a8b5f4f7b1f1d5b9e4f3f4d1a8b5f".to_string()),
        unsigned_payload: unsigned_transfer_payload(),
        signed_payload: None,
        transaction_hash: if status == "pending" {
            None
        } else {
            Some("0xhash".to_string())
        },
        transaction_link: None,
        status: status.to_string(),
    }
}

pub fn operation_model(
    kind: OperationKind,
    transaction_statuses: &[&str],
) -> OperationModel {
    let mut model = OperationModel {
        operation_id: "op-1".to_string(),
        wallet_id: "w-1".to_string(),
        address_id: "a-1".to_string(),
        network_id: "base-sepolia".to_string(),
        kind,
        asset_id: Some("eth".to_string()),
        amount: Some("500000000000000000".to_string()),
        destination: Some("0x4d9e4f3f4d1a8b5f4f7b1f1d5b9e4f3f4d1a8b5f".to_string()),
        from_asset_id: None,
        to_asset_id: None,
        to_amount: None,
        contract_address: None,
        method: None,
        args: None,
        staking_action: None,
        staking_mode: None,
        transactions: transaction_statuses
            .iter()
            .map(|status| transaction_model(status))
            .collect(),
        created_at: None,
    };
    match kind {
        OperationKind::Trade => {
            model.from_asset_id = Some("eth".to_string());
            model.to_asset_id = Some("usdc".to_string());
            model.to_amount = Some("5000000".to_string());
        }
        OperationKind::ContractInvocation => {
            model.contract_address = Some("0xc0ffee254729296a45a3885639ac7e10f9d54979".to_string());
            model.method = Some("mint".to_string());
        }
        OperationKind::StakingOperation => {
            model.staking_action = Some("stake".to_string());
            model.staking_mode = Some("partial".to_string());
        }
        OperationKind::Transfer | OperationKind::SmartContractDeployment => {}
    }
    model
}

pub fn balance_model(asset_id: &str, decimals: u32, amount: &str) -> BalanceModel {
    use crate::api::models::AssetModel;
    BalanceModel {
        amount: amount.to_string(),
        asset: AssetModel {
            asset_id: asset_id.to_string(),
            network_id: "base-sepolia".to_string(),
            decimals: Some(decimals),
            contract_address: None,
        },
    }
}
