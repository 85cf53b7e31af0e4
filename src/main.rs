//! Comet collateral swap
//!
//! Quotes, and optionally executes, a swap of one supplied collateral for
//! another on a Compound III market in a single flash-loan-funded transaction.
//! Prints the current position, the route and the predicted position.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use collateral_swap_chain::{RpcLedger, TransactionSender};
use collateral_swap_core::{CollateralSwapSdk, SwapConfig};

/// Environment variable names.
mod env {
    pub const COMET: &str = "COMET";
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
    pub const FROM_COLLATERAL: &str = "FROM_COLLATERAL";
    pub const TO_COLLATERAL: &str = "TO_COLLATERAL";
    pub const AMOUNT: &str = "AMOUNT";
    pub const CONFIG_PATH: &str = "CONFIG_PATH";
    pub const RPC_URL: &str = "RPC_URL";
    pub const EXECUTE: &str = "EXECUTE";
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,collateral_swap_core=debug,collateral_swap_chain=debug")
        }))
        .init();

    let args = load_args()?;
    let config = match std::env::var(env::CONFIG_PATH) {
        Ok(path) => SwapConfig::from_file(&path)?,
        Err(_) => SwapConfig::embedded()?,
    };

    for deployment in CollateralSwapSdk::deployments(&config)? {
        info!(
            comet = %deployment.comet_key,
            chain_id = deployment.chain_id,
            base = %deployment.asset,
            "Available deployment"
        );
    }

    let comet = config.comet(&args.comet)?;
    let rpc_url = match std::env::var(env::RPC_URL) {
        Ok(url) => url,
        Err(_) => config
            .network(comet.chain_id)
            .map(|n| n.rpc_url.clone())
            .filter(|url| !url.is_empty())
            .with_context(|| format!("no RPC url configured for chain {}", comet.chain_id))?,
    };

    let sender = TransactionSender::new(&args.private_key, &rpc_url, comet.chain_id)?;
    let ledger = Arc::new(RpcLedger::new(&rpc_url)?);
    let sdk = CollateralSwapSdk::new(&config, &args.comet, sender.address, ledger)?;

    info!(
        comet = %args.comet,
        user = %sender.address,
        from = %args.from,
        to = %args.to,
        amount = %args.amount,
        "Starting collateral swap"
    );

    let current = sdk.current_position().await?;
    println!("Current position:\n{}", serde_json::to_string_pretty(&current)?);

    let route = sdk.collateral_swap_route(args.from, args.to, args.amount).await?;
    println!("Route:\n{}", serde_json::to_string_pretty(&route)?);

    let predicted = sdk.predicted_position(&route).await?;
    println!("Predicted position:\n{}", serde_json::to_string_pretty(&predicted)?);

    if !args.execute {
        info!("Set {}=true to submit the swap", env::EXECUTE);
        return Ok(());
    }
    if !route.is_supported {
        warn!("Route is not supported, not submitting");
        return Ok(());
    }

    let tx_hash = sdk.swap_collateral(&route, &sender).await?;
    info!(tx_hash = %tx_hash, "Collateral swap executed");
    Ok(())
}

/// Arguments loaded from environment.
struct Args {
    comet: String,
    private_key: String,
    from: Address,
    to: Address,
    amount: U256,
    execute: bool,
}

fn load_args() -> Result<Args> {
    let get_env = |name: &str| -> Result<String> {
        std::env::var(name).map_err(|_| anyhow::anyhow!("Missing env var: {}", name))
    };

    let get_address = |name: &str| -> Result<Address> {
        get_env(name)?
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address for {}: {}", name, e))
    };

    let amount = get_env(env::AMOUNT)?;
    Ok(Args {
        comet: get_env(env::COMET)?,
        private_key: get_env(env::PRIVATE_KEY)?,
        from: get_address(env::FROM_COLLATERAL)?,
        to: get_address(env::TO_COLLATERAL)?,
        amount: amount
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid amount {}: {}", amount, e))?,
        execute: get_env(env::EXECUTE)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false),
    })
}
