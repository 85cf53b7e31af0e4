//! Collateral swap core logic.
//!
//! This crate provides the Comet collateral swap SDK:
//! - Configuration: networks, Comet markets, collateral swap contracts
//! - Loan providers (Equalizer, AAVE) and best-provider selection
//! - Collateral and position reads on a Comet market
//! - Swap routes with fee breakdown
//! - EIP-712 authorizations and swap execution

mod collaterals;
pub mod config;
mod error;
mod position;
pub mod providers;
mod route;
mod sdk;
mod signatures;
#[cfg(test)]
mod testing;
pub mod u256_math;

pub use collaterals::{
    asset_infos, pick_asset, supported_collaterals, user_collaterals, Asset, UserAsset,
};
pub use config::{CometDeployment, ProviderDeployments, SwapConfig};
pub use error::{SwapError, SwapResult};
pub use position::{
    borrowed_in_base_units, compute_position, current_position, predict_balances,
    predicted_position, Position,
};
pub use providers::{
    select_best, select_best_provider, AaveProvider, EqualizerProvider, LoanProvider,
    LoanProviderId, LoanProviders, LoanRequest, SelectedProvider,
};
pub use route::{CollateralSwapRoute, FeeLeg, SwapFees};
pub use sdk::CollateralSwapSdk;
pub use signatures::{authorization_pair, sign_authorizations, signature_params, SignatureParams};
