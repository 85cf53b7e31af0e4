//! Configuration for the collateral swap SDK.
//!
//! This module provides:
//! - Network configuration (RPC endpoint, collateral swap contracts)
//! - Comet market configuration
//! - API endpoints for the quote and price services
//! - Resolution into [`ProviderDeployments`] and [`CometDeployment`]s
//!
//! Values may reference environment variables as `${VAR}`. An unset variable
//! expands to an empty string, which for a provider address means "not
//! deployed".

mod deployment;
mod network;

pub use deployment::{split_comet_key, CometDeployment, ProviderDeployments};
pub use network::{LoanProviderAddresses, NetworkConfig};

use crate::error::{SwapError, SwapResult};
use crate::providers::LoanProviderId;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub comets: Vec<CometConfig>,
    #[serde(default)]
    pub api: ApiConfig,
}

/// A Comet market by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CometConfig {
    pub key: String,
    pub address: String,
}

/// External API endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub wido_url: Option<String>,
    #[serde(default)]
    pub coingecko_url: Option<String>,
}

impl SwapConfig {
    /// Load config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse config from TOML and expand environment variables.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut config: SwapConfig = toml::from_str(content)?;
        config.expand_env_vars()?;
        Ok(config)
    }

    /// The embedded default configuration.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Expand environment variables in config values.
    pub fn expand_env_vars(&mut self) -> anyhow::Result<()> {
        for network in &mut self.networks {
            network.expand_env_vars()?;
        }
        for comet in &mut self.comets {
            comet.address = expand_env(&comet.address)?;
        }
        if let Some(url) = self.api.wido_url.as_mut() {
            *url = expand_env(url)?;
        }
        if let Some(url) = self.api.coingecko_url.as_mut() {
            *url = expand_env(url)?;
        }
        Ok(())
    }

    /// Network by chain ID.
    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Network by name.
    pub fn network_by_name(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// Build the provider deployment table.
    ///
    /// Every configured network becomes a supported chain, even when no
    /// provider is deployed on it.
    pub fn provider_deployments(&self) -> SwapResult<ProviderDeployments> {
        let mut table = ProviderDeployments::new();
        for network in &self.networks {
            table.add_chain(network.chain_id);
            for id in LoanProviderId::ALL {
                let raw = network.loan_providers.get(id);
                if raw.trim().is_empty() {
                    debug!(
                        chain_id = network.chain_id,
                        provider = %id,
                        "Loan provider not deployed"
                    );
                    continue;
                }
                let field = format!("{}.loan_providers.{}", network.name, id.key());
                let contract = deployment::parse_address(&field, raw)?;
                table.insert(network.chain_id, id, contract);
            }
        }
        Ok(table)
    }

    /// Resolve all Comet markets whose network and address are configured.
    pub fn comet_deployments(&self) -> SwapResult<Vec<CometDeployment>> {
        let mut deployments = Vec::with_capacity(self.comets.len());
        for comet in &self.comets {
            match self.resolve_comet(comet)? {
                Some(deployment) => deployments.push(deployment),
                None => warn!(
                    comet = %comet.key,
                    "Comet network or address not configured, skipping"
                ),
            }
        }
        Ok(deployments)
    }

    /// Resolve a single Comet market by key.
    pub fn comet(&self, key: &str) -> SwapResult<CometDeployment> {
        let comet = self
            .comets
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| SwapError::UnsupportedComet(key.to_string()))?;
        self.resolve_comet(comet)?
            .ok_or_else(|| SwapError::UnsupportedComet(key.to_string()))
    }

    fn resolve_comet(&self, comet: &CometConfig) -> SwapResult<Option<CometDeployment>> {
        let Some((network_name, asset)) = split_comet_key(&comet.key) else {
            return Ok(None);
        };
        let Some(network) = self.network_by_name(network_name) else {
            return Ok(None);
        };
        if comet.address.trim().is_empty() {
            return Ok(None);
        }
        let address = deployment::parse_address(&comet.key, &comet.address)?;
        Ok(Some(CometDeployment {
            comet_key: comet.key.clone(),
            chain_id: network.chain_id,
            address,
            asset,
        }))
    }
}

/// Expand ${VAR_NAME} patterns with environment variable values.
///
/// Unset variables expand to an empty string.
pub(crate) fn expand_env(s: &str) -> anyhow::Result<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")?;
    let expanded = re.replace_all(s, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    const TEST_CONFIG: &str = r#"
        [[networks]]
        chain_id = 1
        name = "mainnet"
        rpc_url = "https://eth.example"

        [networks.loan_providers]
        equalizer = "0x1111111111111111111111111111111111111111"
        aave = "${CONFIG_TEST_UNSET_AAVE}"

        [[networks]]
        chain_id = 137
        name = "polygon"

        [[comets]]
        key = "mainnet_usdc"
        address = "0xc3d688B66703497DAA19211EEdff47f25384cdc3"

        [[comets]]
        key = "fuji_usdc"
        address = "0x0000000000000000000000000000000000000001"
    "#;

    #[test]
    fn test_expand_env() {
        // Use unique var name to avoid conflicts with parallel tests
        std::env::set_var("CONFIG_TEST_VAR", "test_value");
        assert_eq!(expand_env("${CONFIG_TEST_VAR}").unwrap(), "test_value");
        assert_eq!(
            expand_env("prefix_${CONFIG_TEST_VAR}_suffix").unwrap(),
            "prefix_test_value_suffix"
        );
        assert_eq!(expand_env("no_vars").unwrap(), "no_vars");
        std::env::remove_var("CONFIG_TEST_VAR");
    }

    #[test]
    fn test_unset_var_expands_to_empty() {
        assert_eq!(expand_env("${CONFIG_TEST_NEVER_SET}").unwrap(), "");
    }

    #[test]
    fn test_provider_deployments_from_config() {
        let config = SwapConfig::from_toml(TEST_CONFIG).unwrap();
        let table = config.provider_deployments().unwrap();

        assert_eq!(
            table.address(1, LoanProviderId::Equalizer).unwrap(),
            Some(Address::repeat_byte(0x11))
        );
        assert_eq!(table.address(1, LoanProviderId::Aave).unwrap(), None);
        assert!(table.supports_chain(137));
        assert!(table.deployed(137).unwrap().is_empty());
        assert!(matches!(
            table.address(42161, LoanProviderId::Aave),
            Err(SwapError::UnsupportedChain(42161))
        ));
    }

    #[test]
    fn test_malformed_provider_address() {
        let content = TEST_CONFIG.replace("0x1111111111111111111111111111111111111111", "0x11");
        let config = SwapConfig::from_toml(&content).unwrap();
        assert!(matches!(
            config.provider_deployments(),
            Err(SwapError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_comet_deployments_skip_unknown_networks() {
        let config = SwapConfig::from_toml(TEST_CONFIG).unwrap();
        let deployments = config.comet_deployments().unwrap();

        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].comet_key, "mainnet_usdc");
        assert_eq!(deployments[0].chain_id, 1);
        assert_eq!(deployments[0].asset, "USDC");
    }

    #[test]
    fn test_unknown_comet() {
        let config = SwapConfig::from_toml(TEST_CONFIG).unwrap();
        assert!(matches!(
            config.comet("mainnet_dai"),
            Err(SwapError::UnsupportedComet(_))
        ));
        assert!(matches!(
            config.comet("fuji_usdc"),
            Err(SwapError::UnsupportedComet(_))
        ));
        assert!(config.comet("mainnet_usdc").is_ok());
    }

    #[test]
    fn test_embedded_config_parses() {
        let config = SwapConfig::embedded().unwrap();
        assert!(config.network(1).is_some());
        assert!(config.network(137).is_some());
        assert!(config.comet("mainnet_usdc").is_ok());
        assert!(config.comet("polygon_usdc").is_ok());
    }

    #[test]
    fn test_embedded_config_lists_testnets() {
        let config = SwapConfig::embedded().unwrap();
        let testnets = [
            ("goerli", 5),
            ("mumbai", 80001),
            ("fuji", 43113),
            ("goerli_optimism", 420),
        ];
        for (name, chain_id) in testnets {
            assert_eq!(config.network_by_name(name).map(|n| n.chain_id), Some(chain_id));
        }

        let goerli = config.comet("goerli_weth").unwrap();
        assert_eq!(goerli.chain_id, 5);
        assert_eq!(goerli.asset, "WETH");
        assert_eq!(config.comet("mumbai_usdc").unwrap().chain_id, 80001);

        // testnets have no collateral swap contracts
        let table = config.provider_deployments().unwrap();
        assert!(table.deployed(5).unwrap().is_empty());
        assert!(table.deployed(420).unwrap().is_empty());
    }

    #[test]
    fn test_comet_without_address_is_skipped() {
        let content = TEST_CONFIG.replace(
            "0xc3d688B66703497DAA19211EEdff47f25384cdc3",
            "${CONFIG_TEST_UNSET_COMET}",
        );
        let config = SwapConfig::from_toml(&content).unwrap();

        assert!(config.comet_deployments().unwrap().is_empty());
        assert!(matches!(
            config.comet("mainnet_usdc"),
            Err(SwapError::UnsupportedComet(_))
        ));
    }
}
