//! External API clients for the collateral swap SDK.
//!
//! This crate provides HTTP clients for:
//! - Wido: swap quotes and token manager lookup
//! - CoinGecko: USD token prices for fee reporting

mod coingecko;
mod wido;

pub use coingecko::{platform_for_chain, CoingeckoClient, MAX_ADDRESSES_PER_REQUEST};
pub use wido::{QuoteRequest, QuoteResponse, RouteProvider, WidoClient};
