//! Collaborator ledger-management API
//!
//! The client consumes the platform through the `LedgerApi` trait; the
//! default implementation is the REST client in `rest`. Handles are passed
//! into each component explicitly - there is no process-wide client registry.

pub mod models;
pub mod rest;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::error::Result;
use models::{
    BalanceModel, BroadcastRequest, CreateOperationRequest, FaucetTransactionModel,
    OperationModel, PageModel, StakingContextModel, StakingContextRequest,
};

/// What a balance query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceScope {
    /// All addresses in a wallet, aggregated server-side
    Wallet { wallet_id: String },
    /// A single address
    Address {
        wallet_id: String,
        address_id: String,
    },
}

/// Abstract operations the client needs from the ledger-management API.
///
/// Exact wire shapes are owned by the platform; the client treats models as
/// opaque data. Remote failures are never retried here - they surface to the
/// caller as typed errors.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        request: &CreateOperationRequest,
    ) -> Result<OperationModel>;

    async fn broadcast_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
        request: &BroadcastRequest,
    ) -> Result<OperationModel>;

    async fn get_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
    ) -> Result<OperationModel>;

    async fn list_operations(
        &self,
        wallet_id: &str,
        address_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PageModel<OperationModel>>;

    async fn list_balances(
        &self,
        scope: &BalanceScope,
        page_token: Option<&str>,
    ) -> Result<PageModel<BalanceModel>>;

    /// Balance for a single asset; `None` when the server has no record.
    async fn get_balance(
        &self,
        scope: &BalanceScope,
        asset_id: &str,
    ) -> Result<Option<BalanceModel>>;

    async fn get_staking_context(
        &self,
        request: &StakingContextRequest,
    ) -> Result<StakingContextModel>;

    /// Fund an address from the testnet faucet.
    async fn request_faucet_funds(
        &self,
        wallet_id: &str,
        address_id: &str,
        asset_id: Option<&str>,
    ) -> Result<FaucetTransactionModel>;
}
