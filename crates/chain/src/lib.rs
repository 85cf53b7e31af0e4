//! Collateral swap chain interaction layer.
//!
//! This crate provides:
//! - Read-only ledger access behind the [`LedgerReader`] trait
//! - Contract bindings for Comet, AAVE V3, ERC-3156 lenders and the
//!   collateral swap contract
//! - Transaction signing (EIP-712 digests) and sending

pub mod contracts;
mod ledger;
mod signer;

pub use contracts::{
    comet_domain, encode_swap_collateral, AssetInfo, Authorization, AuthorizationSig,
    AuthorizationSigs, Collateral, IAavePool, IComet, IERC20, IERC3156FlashLender,
    IWidoCollateralSwap, ReserveData, WidoSwap, AUTHORIZATION_EXPIRY,
};
pub use ledger::{read_contract, LedgerError, LedgerReader, LedgerResult, RpcLedger};
pub use signer::{TransactionSender, TransactionSenderBuilder};
