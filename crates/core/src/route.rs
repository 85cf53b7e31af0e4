//! Collateral swap routes and their fee breakdown.

use crate::error::{SwapError, SwapResult};
use crate::providers::LoanProviderId;
use crate::u256_math::{apply_fee_bps, to_units_f64};
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A quoted collateral swap, ready to be executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralSwapRoute {
    pub is_supported: bool,
    /// Loan provider funding the swap
    pub provider: LoanProviderId,
    /// Aggregator router
    pub to: Option<Address>,
    /// Router calldata
    pub data: Option<Bytes>,
    /// Spender approved for the router
    pub token_manager: Address,
    pub from_collateral: Address,
    pub from_collateral_amount: U256,
    pub to_collateral: Address,
    pub to_collateral_amount: U256,
    pub to_collateral_min_amount: U256,
    pub price: Option<String>,
    pub fees: SwapFees,
}

/// Fees of a swap, in token units and USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFees {
    /// Loan provider fee, in destination token units
    pub provider_fee: f64,
    /// Aggregator fee, in source token units
    pub wido_fee: f64,
    pub wido_fee_usd: f64,
    pub provider_fee_usd: f64,
    pub total_usd: f64,
}

/// One side of a swap, for fee conversion.
#[derive(Debug, Clone, Copy)]
pub struct FeeLeg {
    pub token: Address,
    pub decimals: u8,
}

impl SwapFees {
    /// Compute fees from the aggregator fee rate and the loan provider fee.
    ///
    /// `prices` maps lowercased token addresses to USD; missing prices count
    /// as zero.
    pub fn compute(
        from: FeeLeg,
        amount: U256,
        wido_fee_bps: u32,
        to: FeeLeg,
        provider_fee: U256,
        prices: &HashMap<String, f64>,
    ) -> SwapResult<Self> {
        let fee_bps = U256::from(wido_fee_bps);
        let wido_fee =
            apply_fee_bps(amount, fee_bps).ok_or(SwapError::FeeOverflow { amount, fee_bps })?;
        let wido_fee = to_units_f64(wido_fee, from.decimals);
        let provider_fee = to_units_f64(provider_fee, to.decimals);

        let wido_fee_usd = wido_fee * usd_price(prices, from.token);
        let provider_fee_usd = provider_fee * usd_price(prices, to.token);

        Ok(Self {
            provider_fee,
            wido_fee,
            wido_fee_usd,
            provider_fee_usd,
            total_usd: wido_fee_usd + provider_fee_usd,
        })
    }
}

impl CollateralSwapRoute {
    /// Router and calldata, when the route can be executed.
    pub fn swap_call(&self) -> Option<(Address, &Bytes)> {
        if !self.is_supported {
            return None;
        }
        match (self.to, self.data.as_ref()) {
            (Some(router), Some(data)) if !data.is_empty() => Some((router, data)),
            _ => None,
        }
    }
}

fn usd_price(prices: &HashMap<String, f64>, token: Address) -> f64 {
    let key = format!("{:?}", token).to_lowercase();
    prices.get(&key).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: Address = Address::repeat_byte(0xaa);
    const WETH: Address = Address::repeat_byte(0xbb);

    fn prices() -> HashMap<String, f64> {
        let mut prices = HashMap::new();
        prices.insert(format!("{:?}", USDC).to_lowercase(), 1.0);
        prices.insert(format!("{:?}", WETH).to_lowercase(), 2000.0);
        prices
    }

    #[test]
    fn test_fees_in_units_and_usd() {
        // 10_000 USDC at 3 bps -> 3 USDC; 0.001 WETH provider fee -> $2
        let fees = SwapFees::compute(
            FeeLeg { token: USDC, decimals: 6 },
            U256::from(10_000_000_000u64),
            3,
            FeeLeg { token: WETH, decimals: 18 },
            U256::from(1_000_000_000_000_000u64),
            &prices(),
        )
        .unwrap();

        assert!((fees.wido_fee - 3.0).abs() < 1e-9);
        assert!((fees.provider_fee - 0.001).abs() < 1e-12);
        assert!((fees.wido_fee_usd - 3.0).abs() < 1e-9);
        assert!((fees.provider_fee_usd - 2.0).abs() < 1e-9);
        assert!((fees.total_usd - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let fees = SwapFees::compute(
            FeeLeg { token: USDC, decimals: 6 },
            U256::from(10_000_000_000u64),
            3,
            FeeLeg { token: Address::repeat_byte(0xcc), decimals: 18 },
            U256::from(1_000_000_000_000_000u64),
            &prices(),
        )
        .unwrap();
        assert_eq!(fees.provider_fee_usd, 0.0);
        assert!((fees.total_usd - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fee_overflow_is_an_error() {
        let result = SwapFees::compute(
            FeeLeg { token: USDC, decimals: 6 },
            U256::MAX,
            30,
            FeeLeg { token: WETH, decimals: 18 },
            U256::ZERO,
            &prices(),
        );
        assert!(matches!(result, Err(SwapError::FeeOverflow { .. })));
    }

    fn route() -> CollateralSwapRoute {
        CollateralSwapRoute {
            is_supported: true,
            provider: LoanProviderId::Aave,
            to: Some(Address::repeat_byte(1)),
            data: Some(Bytes::from(vec![0xde, 0xad])),
            token_manager: Address::repeat_byte(2),
            from_collateral: USDC,
            from_collateral_amount: U256::from(100),
            to_collateral: WETH,
            to_collateral_amount: U256::from(99),
            to_collateral_min_amount: U256::from(98),
            price: Some("0.99".into()),
            fees: SwapFees::default(),
        }
    }

    #[test]
    fn test_route_json_is_camel_case() {
        let json = serde_json::to_value(route()).unwrap();
        assert_eq!(json["provider"], 1);
        assert_eq!(json["isSupported"], true);
        assert!(json.get("toCollateralMinAmount").is_some());
        assert!(json["fees"].get("widoFeeUsd").is_some());

        let parsed: CollateralSwapRoute = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, route());
    }

    #[test]
    fn test_swap_call_requires_supported_route() {
        assert!(route().swap_call().is_some());

        let mut unsupported = route();
        unsupported.is_supported = false;
        assert!(unsupported.swap_call().is_none());

        let mut no_data = route();
        no_data.data = None;
        assert!(no_data.swap_call().is_none());
    }
}
