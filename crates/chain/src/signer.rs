//! Transaction signer and sender for collateral swaps.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default gas limit for a collateral swap (withdraw + flash loan + swap + supply).
const DEFAULT_SWAP_GAS_LIMIT: u64 = 1_500_000;

/// Builder for TransactionSender with flexible configuration.
pub struct TransactionSenderBuilder {
    rpc_url: String,
    chain_id: u64,
    gas_limit: Option<u64>,
}

impl TransactionSenderBuilder {
    /// Create a new builder.
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            gas_limit: None,
        }
    }

    /// Set a custom gas limit.
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Build the TransactionSender.
    pub fn build(self, private_key: &str) -> Result<TransactionSender> {
        // Parse private key (with or without 0x prefix)
        let key_str = private_key.trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str.parse().context("invalid private key")?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());
        let rpc_url = Url::parse(&self.rpc_url)
            .with_context(|| format!("invalid RPC url {}", self.rpc_url))?;

        info!(
            address = %address,
            chain_id = self.chain_id,
            "Transaction sender initialized"
        );

        Ok(TransactionSender {
            rpc_url,
            signer,
            wallet,
            address,
            chain_id: self.chain_id,
            gas_limit: self.gas_limit.unwrap_or(DEFAULT_SWAP_GAS_LIMIT),
        })
    }
}

/// Signs authorizations and submits transactions on behalf of the wallet holder.
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: Url,
    /// Local key, used for EIP-712 hashes
    signer: PrivateKeySigner,
    /// Wallet, used for transactions
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
    /// Chain ID the sender is configured for
    chain_id: u64,
    /// Gas limit for swap transactions
    gas_limit: u64,
}

impl TransactionSender {
    /// Create a new transaction sender from private key.
    pub fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        TransactionSenderBuilder::new(rpc_url, chain_id).build(private_key)
    }

    /// Configured chain ID.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Chain ID reported by the RPC endpoint the wallet is connected to.
    pub async fn connected_chain_id(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());
        Ok(provider.get_chain_id().await?)
    }

    /// Sign a 32-byte digest, returning `r || s || v` with `v` in {27, 28}.
    pub fn sign_hash(&self, hash: &B256) -> Result<[u8; 65]> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .context("failed to sign hash")?;
        Ok(signature.as_bytes())
    }

    /// Send a transaction and wait for confirmation.
    pub async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
        value: U256,
    ) -> Result<B256> {
        let total_start = Instant::now();

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.clone());

        let nonce = provider.get_transaction_count(self.address).await?;
        let gas_price = provider.get_gas_price().await?;

        debug!(
            to = %to,
            calldata_len = calldata.len(),
            value = %value,
            nonce = nonce,
            "Preparing transaction"
        );

        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_input(calldata)
            .with_value(value)
            .with_nonce(nonce)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id);

        let pending = provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();

        info!(tx_hash = %tx_hash, "Transaction submitted, waiting for confirmation");

        let receipt = pending.get_receipt().await?;
        let total_elapsed = total_start.elapsed();

        if receipt.status() {
            info!(
                tx_hash = %tx_hash,
                block = receipt.block_number.unwrap_or(0),
                gas_used = receipt.gas_used,
                total_ms = total_elapsed.as_millis(),
                "Transaction confirmed"
            );
            Ok(tx_hash)
        } else {
            warn!(
                tx_hash = %tx_hash,
                total_ms = total_elapsed.as_millis(),
                "Transaction reverted"
            );
            anyhow::bail!("Transaction reverted: {:?}", tx_hash)
        }
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (DO NOT USE IN PRODUCTION)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_sender_address_from_key() {
        let sender = TransactionSender::new(TEST_KEY, "http://localhost:8545", 1).unwrap();
        assert_eq!(
            format!("{:?}", sender.address).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(sender.chain_id(), 1);
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(TransactionSender::new("0x1234", "http://localhost:8545", 1).is_err());
    }

    #[test]
    fn test_sign_hash_is_deterministic() {
        let sender = TransactionSender::new(TEST_KEY, "http://localhost:8545", 1).unwrap();
        let hash = B256::repeat_byte(0x42);

        let first = sender.sign_hash(&hash).unwrap();
        let second = sender.sign_hash(&hash).unwrap();
        assert_eq!(first, second);
        assert!(first[64] == 27 || first[64] == 28);
    }

    #[test]
    fn test_builder_gas_limit() {
        let sender = TransactionSenderBuilder::new("http://localhost:8545", 137)
            .gas_limit(2_000_000)
            .build(TEST_KEY)
            .unwrap();
        assert_eq!(sender.gas_limit, 2_000_000);
        assert_eq!(sender.chain_id(), 137);
    }

    #[tokio::test]
    #[ignore] // Requires a local node
    async fn test_connected_chain_id() {
        let sender = TransactionSender::new(TEST_KEY, "http://localhost:8545", 1).unwrap();
        assert!(sender.connected_chain_id().await.is_ok());
    }
}
