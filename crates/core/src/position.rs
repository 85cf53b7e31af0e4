//! User position on a Comet market, in base asset units.

use crate::collaterals::asset_infos;
use crate::error::SwapResult;
use crate::route::CollateralSwapRoute;
use crate::u256_math::{price_to_f64, to_units_f64, u256_to_f64, FACTOR_SCALE};
use alloy::primitives::{Address, U256};
use collateral_swap_chain::{read_contract, AssetInfo, IComet, LedgerReader};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::debug;

/// Position summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Value of all collaterals
    pub collateral_value: f64,
    /// Collateral value at which the position becomes liquidatable, scaled by
    /// the share of borrow capacity in use
    pub liquidation_point: f64,
    /// Borrowable value given the collateral factors
    pub borrow_capacity: f64,
    /// Capacity left after the current borrow
    pub borrow_available: f64,
}

/// Summarize a position from collateral balances and oracle prices.
///
/// `balances` and `prices` follow the order of `infos`. `borrowed` is the
/// outstanding borrow in base units.
pub fn compute_position(
    infos: &[AssetInfo],
    balances: &[U256],
    prices: &[U256],
    borrowed: f64,
) -> Position {
    let mut collateral_value = 0.0;
    let mut borrow_capacity = 0.0;
    let mut liquidation_point = 0.0;

    for ((info, balance), price) in infos.iter().zip(balances).zip(prices) {
        let value = u256_to_f64(*balance) / info.scale as f64 * price_to_f64(*price);
        collateral_value += value;
        borrow_capacity += value * (info.borrowCollateralFactor as f64 / FACTOR_SCALE);
        liquidation_point += value * (info.liquidationFactor as f64 / FACTOR_SCALE);
    }

    let borrow_available = borrow_capacity - borrowed;
    let usage = if borrow_capacity > 0.0 {
        (borrow_capacity - borrow_available) / borrow_capacity
    } else {
        0.0
    };

    Position {
        collateral_value,
        liquidation_point: liquidation_point * usage,
        borrow_capacity,
        borrow_available,
    }
}

/// Borrowed base asset valued in base units.
pub fn borrowed_in_base_units(borrow_balance: U256, base_decimals: u8, base_price: U256) -> f64 {
    to_units_f64(borrow_balance, base_decimals) * price_to_f64(base_price)
}

/// Balances after a swap: the source loses the swapped amount, the
/// destination gains the minimum output.
pub fn predict_balances(
    infos: &[AssetInfo],
    balances: &[U256],
    route: &CollateralSwapRoute,
) -> Vec<U256> {
    infos
        .iter()
        .zip(balances)
        .map(|(info, balance)| {
            if info.asset == route.from_collateral {
                balance.saturating_sub(route.from_collateral_amount)
            } else if info.asset == route.to_collateral {
                balance.saturating_add(route.to_collateral_min_amount)
            } else {
                *balance
            }
        })
        .collect()
}

/// Current position of `user`.
pub async fn current_position(
    ledger: &dyn LedgerReader,
    comet: Address,
    user: Address,
) -> SwapResult<Position> {
    let infos = asset_infos(ledger, comet).await?;
    let (balances, prices) = collateral_details(ledger, comet, &infos, user).await?;
    position_details(ledger, comet, user, &infos, &balances, &prices).await
}

/// Position of `user` once `route` has been executed.
pub async fn predicted_position(
    ledger: &dyn LedgerReader,
    comet: Address,
    user: Address,
    route: &CollateralSwapRoute,
) -> SwapResult<Position> {
    let infos = asset_infos(ledger, comet).await?;
    let (balances, prices) = collateral_details(ledger, comet, &infos, user).await?;
    let predicted = predict_balances(&infos, &balances, route);
    position_details(ledger, comet, user, &infos, &predicted, &prices).await
}

async fn collateral_details(
    ledger: &dyn LedgerReader,
    comet: Address,
    infos: &[AssetInfo],
    user: Address,
) -> SwapResult<(Vec<U256>, Vec<U256>)> {
    let balances = try_join_all(infos.iter().map(|info| async move {
        read_contract(
            ledger,
            comet,
            IComet::collateralBalanceOfCall {
                account: user,
                asset: info.asset,
            },
        )
        .await
        .map(|r| U256::from(r._0))
    }));
    let prices = try_join_all(infos.iter().map(|info| async move {
        read_contract(ledger, comet, IComet::getPriceCall { priceFeed: info.priceFeed })
            .await
            .map(|r| r._0)
    }));

    let (balances, prices) = futures::try_join!(balances, prices)?;
    Ok((balances, prices))
}

async fn position_details(
    ledger: &dyn LedgerReader,
    comet: Address,
    user: Address,
    infos: &[AssetInfo],
    balances: &[U256],
    prices: &[U256],
) -> SwapResult<Position> {
    let base_feed = read_contract(ledger, comet, IComet::baseTokenPriceFeedCall {}).await?._0;
    let (base_price, base_decimals, borrow_balance) = futures::try_join!(
        read_contract(ledger, comet, IComet::getPriceCall { priceFeed: base_feed }),
        read_contract(ledger, comet, IComet::decimalsCall {}),
        read_contract(ledger, comet, IComet::borrowBalanceOfCall { account: user }),
    )?;

    let borrowed = borrowed_in_base_units(borrow_balance._0, base_decimals._0, base_price._0);
    let position = compute_position(infos, balances, prices, borrowed);
    debug!(
        user = %user,
        collateral_value = position.collateral_value,
        borrow_capacity = position.borrow_capacity,
        borrowed = borrowed,
        "Computed position"
    );
    Ok(position)
}
