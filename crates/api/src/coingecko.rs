//! CoinGecko token price client.
//!
//! Fetches USD prices by contract address for a chain's platform. Requests
//! are batched by [`MAX_ADDRESSES_PER_REQUEST`] with a pause before each batch
//! to stay under the public API rate limit.

use alloy::primitives::Address;
use anyhow::Result;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Max contract addresses per price request.
pub const MAX_ADDRESSES_PER_REQUEST: usize = 100;

/// Pause before each batch request.
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Cache TTL for prices.
const PRICE_CACHE_TTL: Duration = Duration::from_secs(30);

/// CoinGecko platform id for a chain.
pub fn platform_for_chain(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("ethereum"),
        137 => Some("polygon-pos"),
        42161 => Some("arbitrum-one"),
        _ => None,
    }
}

type PriceResponse = HashMap<String, HashMap<String, f64>>;

/// Cached price with timestamp.
#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    usd: f64,
    cached_at: Instant,
}

/// CoinGecko API client.
#[derive(Debug)]
pub struct CoingeckoClient {
    client: reqwest::Client,
    base_url: String,
    /// (chain_id, lowercased address) -> price
    cache: DashMap<(u64, String), CachedPrice>,
}

impl Default for CoingeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoingeckoClient {
    /// Create a client against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            cache: DashMap::new(),
        }
    }

    /// Fetch USD prices, keyed by lowercased hex address.
    ///
    /// Tokens CoinGecko does not know are absent from the result.
    #[instrument(skip(self, tokens), fields(count = tokens.len()))]
    pub async fn token_prices(
        &self,
        chain_id: u64,
        tokens: &[Address],
    ) -> Result<HashMap<String, f64>> {
        let platform = platform_for_chain(chain_id)
            .ok_or_else(|| anyhow::anyhow!("chain {} not supported by CoinGecko", chain_id))?;

        let mut prices = HashMap::with_capacity(tokens.len());
        let mut missing = Vec::new();

        for token in tokens {
            let key = token_key(token);
            match self.cached(chain_id, &key) {
                Some(usd) => {
                    prices.insert(key, usd);
                }
                None => missing.push(key),
            }
        }

        if missing.is_empty() {
            debug!("All prices served from cache");
            return Ok(prices);
        }

        for batch in missing.chunks(MAX_ADDRESSES_PER_REQUEST) {
            tokio::time::sleep(BATCH_PAUSE).await;
            let fetched = self.fetch_batch(platform, batch).await?;

            let now = Instant::now();
            for (address, usd) in fetched {
                self.cache
                    .insert((chain_id, address.clone()), CachedPrice { usd, cached_at: now });
                prices.insert(address, usd);
            }
        }

        debug!(found = prices.len(), "Fetched token prices");
        Ok(prices)
    }

    /// Fetch one batch of addresses.
    async fn fetch_batch(
        &self,
        platform: &str,
        addresses: &[String],
    ) -> Result<Vec<(String, f64)>> {
        let url = format!("{}/simple/token_price/{}", self.base_url, platform);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("contract_addresses", addresses.join(",")),
                ("vs_currencies", "usd".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko API error: {} - {}", status, body);
        }

        let body: PriceResponse = response.json().await?;
        Ok(parse_prices(body))
    }

    fn cached(&self, chain_id: u64, key: &str) -> Option<f64> {
        let entry = self.cache.get(&(chain_id, key.to_string()))?;
        if entry.cached_at.elapsed() < PRICE_CACHE_TTL {
            Some(entry.usd)
        } else {
            None
        }
    }
}

fn token_key(token: &Address) -> String {
    format!("{:?}", token).to_lowercase()
}

fn parse_prices(body: PriceResponse) -> Vec<(String, f64)> {
    body.into_iter()
        .filter_map(|(address, currencies)| match currencies.get("usd") {
            Some(usd) => Some((address.to_lowercase(), *usd)),
            None => {
                warn!(address = %address, "Price response without usd quote");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platforms() {
        assert_eq!(platform_for_chain(1), Some("ethereum"));
        assert_eq!(platform_for_chain(137), Some("polygon-pos"));
        assert_eq!(platform_for_chain(42161), Some("arbitrum-one"));
        assert_eq!(platform_for_chain(5), None);
    }

    #[test]
    fn test_parse_prices_lowercases_and_skips_missing_usd() {
        let json = r#"{
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2": { "usd": 1850.5 },
            "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599": { "eur": 30000.0 }
        }"#;
        let body: PriceResponse = serde_json::from_str(json).unwrap();
        let prices = parse_prices(body);

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].0, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert!((prices[0].1 - 1850.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_token_key_is_lowercase_hex() {
        let token: Address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse().unwrap();
        assert_eq!(token_key(&token), "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    }

    #[tokio::test]
    async fn test_unsupported_chain_rejected() {
        let client = CoingeckoClient::new();
        assert!(client.token_prices(5, &[Address::ZERO]).await.is_err());
    }

    #[tokio::test]
    async fn test_cached_prices_skip_network() {
        let client = CoingeckoClient::with_base_url("http://127.0.0.1:1");
        let token = Address::repeat_byte(0x11);
        client.cache.insert(
            (1, token_key(&token)),
            CachedPrice { usd: 2.5, cached_at: Instant::now() },
        );

        let prices = client.token_prices(1, &[token]).await.unwrap();
        assert_eq!(prices.get(&token_key(&token)), Some(&2.5));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_live_prices() {
        let client = CoingeckoClient::new();
        let weth: Address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse().unwrap();
        let prices = client.token_prices(1, &[weth]).await.unwrap();
        assert!(prices.contains_key(&token_key(&weth)));
    }
}
