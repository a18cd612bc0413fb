//! ChainVault client library
//!
//! Client-side objects for a wallet platform: addresses and wallets hold
//! assets; transfers, trades, contract invocations, staking operations, and
//! deployments are created server-side, optionally signed locally, broadcast,
//! and polled until they reach a terminal on-chain state.

pub mod api;
pub mod assets;
pub mod balance;
pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod operations;
pub mod staking;
pub mod tx;

// Re-export commonly used types
pub use assets::{resolve_primary_asset_id, Asset};
pub use balance::BalanceAggregator;
pub use config::Config;
pub use error::{Error, Result};
pub use lifecycle::{run_to_terminal, Broadcastable, ManagedOperation, WaitOptions};
pub use operations::{
    ContractInvocation, Operation, SmartContractDeployment, StakingOperation, Trade, Transfer,
};
pub use staking::{StakingAction, StakingBalances, StakingContext, StakingMode};
pub use tx::{TransactionEnvelope, TransactionSigner, TransactionStatus};
