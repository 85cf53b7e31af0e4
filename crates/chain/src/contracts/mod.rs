//! Contract bindings used by the collateral swap SDK.
//!
//! # Contracts
//!
//! - [`collateral_swap`]: the Wido collateral swap contract (one per loan provider)
//! - [`aave_v3`]: AAVE V3 pool, used as a fixed-premium flash loan source
//! - [`erc3156`]: ERC-3156 lenders such as Equalizer
//! - [`comet`]: Compound III markets and their EIP-712 authorization
//! - [`common`]: ERC20
//!
//! # Example
//!
//! ```rust,ignore
//! use collateral_swap_chain::{read_contract, contracts::erc3156::IERC3156FlashLender};
//!
//! let max = read_contract(ledger, lender, IERC3156FlashLender::maxFlashLoanCall { token })
//!     .await?
//!     ._0;
//! ```

pub mod aave_v3;
pub mod collateral_swap;
pub mod comet;
pub mod common;
pub mod erc3156;

pub use aave_v3::{IAavePool, ReserveData};
pub use collateral_swap::{
    encode_swap_collateral, AuthorizationSig, AuthorizationSigs, Collateral, IWidoCollateralSwap,
    WidoSwap,
};
pub use comet::{comet_domain, AssetInfo, Authorization, IComet, AUTHORIZATION_EXPIRY};
pub use common::IERC20;
pub use erc3156::IERC3156FlashLender;
