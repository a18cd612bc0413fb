//! Wire models exchanged with the ledger-management API
//!
//! Server-optional fields are explicit `Option`s; nothing here is inferred
//! client-side. Amounts are atomic-unit base-10 integer strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind tag for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transfer,
    Trade,
    ContractInvocation,
    StakingOperation,
    SmartContractDeployment,
}

/// A single transaction inside an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionModel {
    pub network_id: String,
    pub from_address_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address_id: Option<String>,
    pub unsigned_payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_link: Option<String>,
    pub status: String,
}

/// An operation as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationModel {
    pub operation_id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub network_id: String,
    pub kind: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Atomic amount as a base-10 integer string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    // trade legs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<String>,
    // contract invocation / deployment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    // staking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_mode: Option<String>,
    #[serde(default)]
    pub transactions: Vec<TransactionModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for creating an operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperationRequest {
    pub kind: OperationKind,
    pub network_id: String,
    /// Primary-resolved asset id
    pub asset_id: String,
    /// Atomic amount as a base-10 integer string
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_mode: Option<String>,
    /// Client-generated key so a retried create cannot double-spend
    pub idempotency_key: String,
}

impl CreateOperationRequest {
    /// Start a request with the fields every kind shares; kind-specific
    /// fields are filled in by the operation constructors.
    pub fn new(kind: OperationKind, network_id: &str, asset_id: &str, amount: &str) -> Self {
        Self {
            kind,
            network_id: network_id.to_string(),
            asset_id: asset_id.to_string(),
            amount: amount.to_string(),
            destination: None,
            to_asset_id: None,
            contract_address: None,
            method: None,
            args: None,
            data: None,
            staking_action: None,
            staking_mode: None,
            idempotency_key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Request body for broadcasting a signed transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub signed_payload: String,
    /// Index of the transaction within a multi-transaction operation
    #[serde(default)]
    pub transaction_index: usize,
}

/// An asset as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetModel {
    pub asset_id: String,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// A balance: atomic amount plus the asset it is denominated in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceModel {
    /// Atomic amount as a base-10 integer string
    pub amount: String,
    pub asset: AssetModel,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel<T> {
    pub data: Vec<T>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

/// Query for the staking context of an address/asset/mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingContextRequest {
    pub network_id: String,
    pub address_id: String,
    /// Primary-resolved asset id
    pub asset_id: String,
    pub mode: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Staking context balances, all atomic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingContextModel {
    pub stakeable_balance: BalanceModel,
    pub unstakeable_balance: BalanceModel,
    pub claimable_balance: BalanceModel,
}

/// Receipt for a faucet funding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetTransactionModel {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_link: Option<String>,
}
