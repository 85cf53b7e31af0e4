//! Flash loan providers and best-provider selection.
//!
//! Each collateral swap contract borrows the destination asset from one
//! liquidity source. Providers are strategies behind [`LoanProvider`]:
//!
//! - [`EqualizerProvider`]: ERC-3156 lender, capacity + lender-reported fee
//! - [`AaveProvider`]: AAVE V3 pool, fixed premium in basis points
//!
//! [`LoanProviders`] instantiates the providers deployed on a chain and
//! [`select_best`] picks the cheapest eligible one.

mod aave;
mod catalog;
mod equalizer;
mod selector;

pub use aave::AaveProvider;
pub use catalog::LoanProviders;
pub use equalizer::EqualizerProvider;
pub use selector::{select_best, select_best_provider, SelectedProvider};

use crate::error::{SwapError, SwapResult};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tokio::sync::OnceCell;

/// Loan provider identity.
///
/// Ordinals are part of the on-chain encoding: append new variants, never
/// renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LoanProviderId {
    Equalizer = 0,
    Aave = 1,
}

impl LoanProviderId {
    /// All providers in ordinal order.
    pub const ALL: [LoanProviderId; 2] = [LoanProviderId::Equalizer, LoanProviderId::Aave];

    /// Configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Equalizer => "equalizer",
            Self::Aave => "aave",
        }
    }
}

impl From<LoanProviderId> for u8 {
    fn from(id: LoanProviderId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for LoanProviderId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|id| *id as u8 == value)
            .ok_or(value)
    }
}

impl fmt::Display for LoanProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equalizer => write!(f, "Equalizer"),
            Self::Aave => write!(f, "Aave"),
        }
    }
}

impl Serialize for LoanProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for LoanProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        LoanProviderId::try_from(value)
            .map_err(|v| serde::de::Error::custom(format!("unknown loan provider {v}")))
    }
}

/// A transient borrow of `amount` of `asset` on `chain_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanRequest {
    pub chain_id: u64,
    pub asset: Address,
    pub amount: U256,
}

impl LoanRequest {
    pub fn new(chain_id: u64, asset: Address, amount: U256) -> Self {
        Self {
            chain_id,
            asset,
            amount,
        }
    }
}

/// A flash loan source bound to one (asset, amount) request.
#[async_trait]
pub trait LoanProvider: Send + Sync + fmt::Debug {
    /// Provider identity.
    fn id(&self) -> LoanProviderId;

    /// Collateral swap contract wired to this provider.
    fn contract(&self) -> Address;

    /// Whether the provider supports the asset and holds strictly more
    /// liquidity than the requested amount.
    ///
    /// Unsupported assets yield `Ok(false)`; errors are I/O failures only.
    async fn can_be_used(&self) -> SwapResult<bool>;

    /// Compute the fee without memoization.
    async fn compute_fee(&self) -> SwapResult<U256>;

    /// Memo cell backing [`LoanProvider::fee`].
    fn fee_cell(&self) -> &OnceCell<U256>;

    /// Fee for the request, in the asset's smallest unit.
    ///
    /// Computed once per instance; later calls return the memoized value.
    async fn fee(&self) -> SwapResult<U256> {
        self.fee_cell()
            .get_or_try_init(|| self.compute_fee())
            .await
            .copied()
    }
}

/// Resolve and memoize an upstream address (pool, lender) read from the swap
/// contract.
async fn memoized_address<F, Fut>(cell: &OnceCell<Address>, read: F) -> SwapResult<Address>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Address, SwapError>>,
{
    cell.get_or_try_init(read).await.copied()
}
