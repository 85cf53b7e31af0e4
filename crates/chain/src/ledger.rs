//! Read-only ledger access.
//!
//! Everything the SDK reads from chain goes through [`LedgerReader`], a thin
//! `eth_call` abstraction. Typed calls are layered on top with
//! [`read_contract`], which ABI-encodes an `alloy` `sol!` call and decodes its
//! return values.

use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt::Debug;
use thiserror::Error;
use tracing::info;

/// Errors raised while reading from the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid RPC url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("RPC transport failure: {0}")]
    Transport(String),
    #[error("call to {to} reverted or failed: {reason}")]
    CallFailed { to: Address, reason: String },
    #[error("failed to decode {function} result: {reason}")]
    Decode {
        function: &'static str,
        reason: String,
    },
}

/// Result type for ledger reads.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Read-only access to a chain.
#[async_trait]
pub trait LedgerReader: Send + Sync + Debug {
    /// Execute an `eth_call` against `to` at the latest block.
    async fn call(&self, to: Address, calldata: Bytes) -> LedgerResult<Bytes>;

    /// Chain ID the reader is connected to.
    async fn chain_id(&self) -> LedgerResult<u64>;
}

/// Call a typed contract function and decode its return values.
pub async fn read_contract<C>(
    ledger: &dyn LedgerReader,
    to: Address,
    call: C,
) -> LedgerResult<C::Return>
where
    C: SolCall + Send,
{
    let calldata = Bytes::from(call.abi_encode());
    let output = ledger.call(to, calldata).await?;
    C::abi_decode_returns(&output, true).map_err(|e| LedgerError::Decode {
        function: C::SIGNATURE,
        reason: e.to_string(),
    })
}

/// HTTP JSON-RPC backed ledger reader.
#[derive(Debug, Clone)]
pub struct RpcLedger {
    rpc_url: Url,
}

impl RpcLedger {
    /// Create a reader for the given HTTP RPC endpoint.
    pub fn new(rpc_url: &str) -> LedgerResult<Self> {
        let url = Url::parse(rpc_url).map_err(|e| LedgerError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;
        info!(rpc = %url, "RPC ledger configured");
        Ok(Self { rpc_url: url })
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

#[async_trait]
impl LedgerReader for RpcLedger {
    async fn call(&self, to: Address, calldata: Bytes) -> LedgerResult<Bytes> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(calldata);

        provider
            .raw_request::<_, Bytes>("eth_call".into(), (tx, BlockNumberOrTag::Latest))
            .await
            .map_err(|e| LedgerError::CallFailed {
                to,
                reason: e.to_string(),
            })
    }

    async fn chain_id(&self) -> LedgerResult<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());
        provider
            .get_chain_id()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))
    }
}
