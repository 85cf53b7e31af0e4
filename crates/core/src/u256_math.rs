//! U256 helpers for fee and position calculations.
//!
//! Amounts stay in U256 for anything that ends up on chain; the `f64`
//! conversions are for reporting values (fees in token units, USD, position
//! summaries) only.

use alloy::primitives::U256;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000u64, 0, 0, 0]);

/// Comet oracle price decimals (8)
pub const PRICE_DECIMALS: u8 = 8;

/// Comet factor scale (1e18)
pub const FACTOR_SCALE: f64 = 1e18;

/// Fee charged in basis points, rounded down.
/// Returns: value * fee_bps / 10000, or `None` if the product overflows
///
/// Example: apply_fee_bps(100, 9) = 0, apply_fee_bps(1_000_000, 9) = 900
#[inline(always)]
pub fn apply_fee_bps(value: U256, fee_bps: U256) -> Option<U256> {
    value.checked_mul(fee_bps).map(|product| product / BPS_DENOMINATOR)
}

/// Convert U256 to f64, losing precision past 53 bits.
#[inline(always)]
pub fn u256_to_f64(value: U256) -> f64 {
    if value <= U256::from(u128::MAX) {
        let v: u128 = value.to();
        v as f64
    } else {
        value
            .as_limbs()
            .iter()
            .rev()
            .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
    }
}

/// Convert a raw token amount to units.
///
/// Example: to_units_f64(1_500_000, 6) = 1.5
#[inline(always)]
pub fn to_units_f64(value: U256, decimals: u8) -> f64 {
    u256_to_f64(value) / 10f64.powi(decimals as i32)
}

/// Convert a Comet oracle price (8 decimals) to f64.
#[inline(always)]
pub fn price_to_f64(price: U256) -> f64 {
    to_units_f64(price, PRICE_DECIMALS)
}
