//! Wido quote aggregator API client.
//!
//! Provides swap routes (router address + calldata) for same-chain token
//! swaps and the spender (token manager) address that must be approved for
//! those routes.

use alloy::primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.joinwido.com";

/// Liquidity sources the aggregator may route through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteProvider {
    /// 0x protocol
    ZeroEx,
}

impl RouteProvider {
    fn as_param(&self) -> &'static str {
        match self {
            Self::ZeroEx => "0x",
        }
    }
}

/// Parameters for a same-chain swap quote.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub chain_id: u64,
    pub from_token: Address,
    pub to_token: Address,
    /// Input amount (raw, with decimals)
    pub amount: U256,
    /// Address that will execute the swap; omitted for price discovery
    pub user: Option<Address>,
    pub providers: Vec<RouteProvider>,
}

impl QuoteRequest {
    /// Create a quote request routed through 0x.
    pub fn new(chain_id: u64, from_token: Address, to_token: Address, amount: U256) -> Self {
        Self {
            chain_id,
            from_token,
            to_token,
            amount,
            user: None,
            providers: vec![RouteProvider::ZeroEx],
        }
    }

    /// Set the executing address.
    pub fn with_user(mut self, user: Address) -> Self {
        self.user = Some(user);
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("from_chain_id", self.chain_id.to_string()),
            ("from_token", self.from_token.to_string()),
            ("to_chain_id", self.chain_id.to_string()),
            ("to_token", self.to_token.to_string()),
            ("amount", self.amount.to_string()),
        ];
        if let Some(user) = self.user {
            query.push(("user", user.to_string()));
        }
        if !self.providers.is_empty() {
            let providers: Vec<&str> = self.providers.iter().map(RouteProvider::as_param).collect();
            query.push(("providers", providers.join(",")));
        }
        query
    }
}

/// Quote returned by the aggregator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub is_supported: bool,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub to_token_amount: Option<String>,
    #[serde(default)]
    pub min_to_token_amount: Option<String>,
    /// Router to call
    #[serde(default)]
    pub to: Option<Address>,
    /// Router calldata
    #[serde(default)]
    pub data: Option<Bytes>,
    /// Aggregator fee in basis points
    #[serde(default)]
    pub fee_bps: Option<u32>,
}

impl QuoteResponse {
    /// Expected output amount, zero when the route is unsupported or missing.
    pub fn to_amount(&self) -> Result<U256> {
        parse_amount(self.is_supported, self.to_token_amount.as_deref())
    }

    /// Minimum output after slippage, zero when the route is unsupported or missing.
    pub fn min_to_amount(&self) -> Result<U256> {
        parse_amount(self.is_supported, self.min_to_token_amount.as_deref())
    }

    /// Aggregator fee, defaulting to zero.
    pub fn fee_bps(&self) -> u32 {
        self.fee_bps.unwrap_or(0)
    }
}

fn parse_amount(supported: bool, raw: Option<&str>) -> Result<U256> {
    match raw {
        Some(value) if supported && !value.is_empty() => {
            U256::from_str(value).with_context(|| format!("invalid token amount {value}"))
        }
        _ => Ok(U256::ZERO),
    }
}

#[derive(Debug, Deserialize)]
struct SpenderResponse {
    spender: Address,
}

/// Wido API client.
#[derive(Debug, Clone)]
pub struct WidoClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WidoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WidoClient {
    /// Create a client against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Get a swap quote.
    #[instrument(
        skip(self, request),
        fields(chain_id = request.chain_id, from = %request.from_token, to = %request.to_token)
    )]
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse> {
        let url = format!("{}/quote_v2", self.base_url);
        debug!(amount = %request.amount, user = ?request.user, "Requesting quote");

        let response = self
            .client
            .get(&url)
            .query(&request.query())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Wido quote API error: {} - {}", status, body);
        }

        let quote: QuoteResponse = response.json().await?;
        debug!(
            supported = quote.is_supported,
            to_amount = ?quote.to_token_amount,
            fee_bps = ?quote.fee_bps,
            "Got quote"
        );
        Ok(quote)
    }

    /// Get the token manager that must be approved to spend the input token.
    #[instrument(skip(self))]
    pub async fn token_spender(
        &self,
        chain_id: u64,
        from_token: Address,
        to_token: Address,
    ) -> Result<Address> {
        let url = format!("{}/contract_address", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("chain_id", chain_id.to_string()),
                ("from_token", from_token.to_string()),
                ("to_chain_id", chain_id.to_string()),
                ("to_token", to_token.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Wido spender API error: {} - {}", status, body);
        }

        let spender: SpenderResponse = response.json().await?;
        debug!(spender = %spender.spender, "Got token spender");
        Ok(spender.spender)
    }
}
