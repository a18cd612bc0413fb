//! ChainVault CLI - drive wallet-platform operations from the terminal
//!
//! The binary runs under server-managed signing and never loads key
//! material; local signing is a library concern for callers that hold keys.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use chainvault::cli::commands;
use chainvault::config::Config;

/// ChainVault wallet-platform client
#[derive(Parser)]
#[command(name = "chainvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "chainvault.toml")]
    config: String,

    /// Wallet identifier
    #[arg(short, long, env = "CHAINVAULT_WALLET_ID", global = true, default_value = "")]
    wallet: String,

    /// Address identifier
    #[arg(short, long, env = "CHAINVAULT_ADDRESS_ID", global = true, default_value = "")]
    address: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show balances for the address
    Balance {
        /// Limit to a single asset
        asset: Option<String>,
    },

    /// Transfer an asset to a destination address
    Transfer {
        /// Amount in whole units (e.g. 0.5)
        amount: String,

        /// Asset id (e.g. eth, usdc)
        asset: String,

        /// Destination address
        #[arg(long)]
        to: String,
    },

    /// Trade one asset for another
    Trade {
        /// Amount of the source asset in whole units
        amount: String,

        /// Source asset id
        from_asset: String,

        /// Target asset id
        to_asset: String,
    },

    /// Stake, unstake, or claim
    Stake {
        /// Action: stake, unstake, claim
        #[arg(long, default_value = "stake")]
        action: String,

        /// Amount in whole units
        amount: String,

        /// Asset id
        asset: String,

        /// Staking mode: default, partial, native
        #[arg(long, default_value = "default")]
        mode: String,
    },

    /// Show stakeable/unstakeable/claimable balances
    StakingBalances {
        /// Asset id
        asset: String,

        /// Staking mode: default, partial, native
        #[arg(long, default_value = "default")]
        mode: String,
    },

    /// List recent operations for the address
    Operations,

    /// Fund the address from the testnet faucet
    Faucet {
        /// Asset to request (defaults to the network's base asset)
        asset: Option<String>,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chainvault=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Balance { asset } => {
            commands::balance(&config, &cli.wallet, &cli.address, asset.as_deref()).await
        }
        Commands::Transfer { amount, asset, to } => {
            commands::transfer(&config, &cli.wallet, &cli.address, &amount, &asset, &to).await
        }
        Commands::Trade {
            amount,
            from_asset,
            to_asset,
        } => {
            commands::trade(
                &config,
                &cli.wallet,
                &cli.address,
                &amount,
                &from_asset,
                &to_asset,
            )
            .await
        }
        Commands::Stake {
            action,
            amount,
            asset,
            mode,
        } => {
            commands::stake(
                &config,
                &cli.wallet,
                &cli.address,
                &action,
                &amount,
                &asset,
                &mode,
            )
            .await
        }
        Commands::StakingBalances { asset, mode } => {
            commands::staking_balances(&config, &cli.address, &asset, &mode).await
        }
        Commands::Operations => commands::list(&config, &cli.wallet, &cli.address).await,
        Commands::Faucet { asset } => {
            commands::faucet(&config, &cli.wallet, &cli.address, asset.as_deref()).await
        }
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
