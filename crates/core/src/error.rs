//! Error type for the collateral swap SDK.

use alloy::primitives::{Address, U256};
use collateral_swap_chain::LedgerError;
use thiserror::Error;

/// Errors raised by the SDK.
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("chain {0} is not configured")]
    UnsupportedChain(u64),

    #[error("comet {0} not supported")]
    UnsupportedComet(String),

    #[error("invalid address {value:?} for {field}")]
    InvalidAddress { field: String, value: String },

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("collateral {0} not supported")]
    CollateralNotSupported(Address),

    #[error("from amount {requested} bigger than balance {available}")]
    InsufficientBalance { requested: U256, available: U256 },

    #[error("there is no loan provider to enable a swap of {amount} of {asset}")]
    NoLoanProvider { asset: Address, amount: U256 },

    #[error("fee of {fee_bps} bps on {amount} overflows")]
    FeeOverflow { amount: U256, fee_bps: U256 },

    #[error("wallet is on chain {actual}, comet is on chain {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("route is not executable: {0}")]
    UnexecutableRoute(&'static str),

    #[error("quote failed: {0:#}")]
    Quote(anyhow::Error),

    #[error("price lookup failed: {0:#}")]
    Prices(anyhow::Error),

    #[error("signing failed: {0:#}")]
    Signing(anyhow::Error),

    #[error("transaction failed: {0:#}")]
    Transaction(anyhow::Error),
}

/// Result type for SDK operations.
pub type SwapResult<T> = Result<T, SwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_is_transparent() {
        let err: SwapError = LedgerError::Transport("connection refused".into()).into();
        assert_eq!(err.to_string(), "RPC transport failure: connection refused");
    }

    #[test]
    fn test_anyhow_context_is_rendered() {
        let inner = anyhow::anyhow!("status 500").context("Wido quote");
        let err = SwapError::Quote(inner);
        assert_eq!(err.to_string(), "quote failed: Wido quote: status 500");
    }
}
