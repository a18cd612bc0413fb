//! CLI command implementations
//!
//! Commands run under server-managed signing: the binary never holds key
//! material, so the sign/broadcast steps happen on the platform side and
//! the client polls until terminal.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use tracing::info;

use crate::api::rest::RestLedgerApi;
use crate::api::{BalanceScope, LedgerApi};
use crate::balance::BalanceAggregator;
use crate::config::Config;
use crate::operations::{
    self, StakingOperation, StakingOperationParams, Trade, TradeParams, Transfer, TransferParams,
};
use crate::staking::{StakingAction, StakingContext, StakingMode};

fn build_api(config: &Config) -> Result<Arc<dyn LedgerApi>> {
    let api = RestLedgerApi::new(&config.api)?;
    Ok(Arc::new(api))
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| anyhow!("invalid amount {raw}: {e}"))
}

/// Show balances for an address, or a single asset's balance
pub async fn balance(
    config: &Config,
    wallet_id: &str,
    address_id: &str,
    asset_id: Option<&str>,
) -> Result<()> {
    let api = build_api(config)?;
    let aggregator = BalanceAggregator::new(api);
    let scope = BalanceScope::Address {
        wallet_id: wallet_id.to_string(),
        address_id: address_id.to_string(),
    };

    match asset_id {
        Some(asset) => {
            let amount = aggregator.get_balance(&scope, asset).await?;
            println!("{asset}: {amount}");
        }
        None => {
            let balances = aggregator.list_balances(&scope).await?;
            if balances.is_empty() {
                println!("(no balances)");
            }
            for (asset, amount) in balances {
                println!("{asset}: {amount}");
            }
        }
    }
    Ok(())
}

/// Transfer an asset to a destination address
pub async fn transfer(
    config: &Config,
    wallet_id: &str,
    address_id: &str,
    amount: &str,
    asset_id: &str,
    destination: &str,
) -> Result<()> {
    let api = build_api(config)?;
    let params = TransferParams {
        amount: parse_amount(amount)?,
        asset_id: asset_id.to_string(),
        destination: destination.to_string(),
    };

    info!("Creating transfer of {} {} to {}", amount, asset_id, destination);
    let transfer = Transfer::execute(
        api,
        wallet_id,
        address_id,
        &config.network.network_id,
        params,
        None,
        config.polling.wait_options(),
    )
    .await?;

    println!("Transfer {}: {:?}", transfer.operation_id(), transfer.status());
    if let Some(hash) = transfer.transaction_hash() {
        println!("  hash: {hash}");
    }
    if let Some(link) = transfer.transaction_link() {
        println!("  link: {link}");
    }
    Ok(())
}

/// Trade one asset for another
pub async fn trade(
    config: &Config,
    wallet_id: &str,
    address_id: &str,
    amount: &str,
    from_asset: &str,
    to_asset: &str,
) -> Result<()> {
    let api = build_api(config)?;
    let params = TradeParams {
        amount: parse_amount(amount)?,
        from_asset_id: from_asset.to_string(),
        to_asset_id: to_asset.to_string(),
    };

    info!("Creating trade of {} {} into {}", amount, from_asset, to_asset);
    let trade = Trade::execute(
        api,
        wallet_id,
        address_id,
        &config.network.network_id,
        params,
        None,
        config.polling.wait_options(),
    )
    .await?;

    println!("Trade {}: {:?}", trade.operation_id(), trade.status());
    if let Some(received) = trade.received_amount() {
        println!("  received: {} {}", received, trade.to_asset().asset_id());
    }
    if let Some(hash) = trade.transaction_hash() {
        println!("  hash: {hash}");
    }
    Ok(())
}

/// Stake, unstake, or claim
#[allow(clippy::too_many_arguments)]
pub async fn stake(
    config: &Config,
    wallet_id: &str,
    address_id: &str,
    action: &str,
    amount: &str,
    asset_id: &str,
    mode: &str,
) -> Result<()> {
    let api = build_api(config)?;
    let action = match action {
        "stake" => StakingAction::Stake,
        "unstake" => StakingAction::Unstake,
        "claim" => StakingAction::Claim,
        other => return Err(anyhow!("unknown staking action {other}")),
    };
    let mode = match mode {
        "default" => StakingMode::Default,
        "partial" => StakingMode::Partial,
        "native" => StakingMode::Native,
        other => return Err(anyhow!("unknown staking mode {other}")),
    };

    let params = StakingOperationParams {
        action,
        amount: parse_amount(amount)?,
        asset_id: asset_id.to_string(),
        mode,
        options: BTreeMap::new(),
    };

    info!("Creating {} of {} {} ({} mode)", action, amount, asset_id, mode);
    let operation = StakingOperation::execute(
        api,
        wallet_id,
        address_id,
        &config.network.network_id,
        params,
        None,
        config.polling.wait_options(),
    )
    .await?;

    println!(
        "Staking operation {}: {:?}",
        operation.operation_id(),
        operation.status()
    );
    for hash in operation.transaction_hashes() {
        println!("  hash: {hash}");
    }
    Ok(())
}

/// Show staking balances for an address/asset/mode
pub async fn staking_balances(
    config: &Config,
    address_id: &str,
    asset_id: &str,
    mode: &str,
) -> Result<()> {
    let api = build_api(config)?;
    let mode = match mode {
        "default" => StakingMode::Default,
        "partial" => StakingMode::Partial,
        "native" => StakingMode::Native,
        other => return Err(anyhow!("unknown staking mode {other}")),
    };

    let context = StakingContext::new(api, &config.network.network_id);
    let balances = context
        .get_balances(address_id, asset_id, mode, &BTreeMap::new())
        .await?;
    println!("stakeable:   {}", balances.stakeable);
    println!("unstakeable: {}", balances.unstakeable);
    println!("claimable:   {}", balances.claimable);
    Ok(())
}

/// List recent operations for an address
pub async fn list(config: &Config, wallet_id: &str, address_id: &str) -> Result<()> {
    let api = build_api(config)?;
    let operations =
        operations::list_operations(api, wallet_id, address_id, config.polling.page_size).await?;

    if operations.is_empty() {
        println!("(no operations)");
    }
    for operation in operations {
        println!(
            "{} {:?} {:?}",
            operation.operation_id(),
            operation.kind(),
            operation.status()
        );
    }
    Ok(())
}

/// Fund an address from the testnet faucet
pub async fn faucet(
    config: &Config,
    wallet_id: &str,
    address_id: &str,
    asset_id: Option<&str>,
) -> Result<()> {
    let api = build_api(config)?;
    let receipt = api
        .request_faucet_funds(wallet_id, address_id, asset_id)
        .await?;
    println!("Faucet transaction: {}", receipt.transaction_hash);
    if let Some(link) = receipt.transaction_link {
        println!("  link: {link}");
    }
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
