//! Per-network configuration.

use crate::providers::LoanProviderId;
use serde::{Deserialize, Serialize};

/// A network the SDK can operate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Network name, matched against the prefix of Comet keys
    pub name: String,
    /// HTTP RPC endpoint (supports ${VAR})
    #[serde(default)]
    pub rpc_url: String,
    /// Collateral swap contracts per loan provider
    #[serde(default)]
    pub loan_providers: LoanProviderAddresses,
}

/// Collateral swap contract per loan provider. Empty means not deployed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanProviderAddresses {
    #[serde(default)]
    pub equalizer: String,
    #[serde(default)]
    pub aave: String,
}

impl LoanProviderAddresses {
    /// Raw configured address for a provider.
    pub fn get(&self, id: LoanProviderId) -> &str {
        match id {
            LoanProviderId::Equalizer => &self.equalizer,
            LoanProviderId::Aave => &self.aave,
        }
    }

    pub(super) fn expand_env_vars(&mut self) -> anyhow::Result<()> {
        self.equalizer = super::expand_env(&self.equalizer)?;
        self.aave = super::expand_env(&self.aave)?;
        Ok(())
    }
}

impl NetworkConfig {
    pub(super) fn expand_env_vars(&mut self) -> anyhow::Result<()> {
        self.rpc_url = super::expand_env(&self.rpc_url)?;
        self.loan_providers.expand_env_vars()
    }
}
