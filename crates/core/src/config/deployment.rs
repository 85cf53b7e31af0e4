//! Resolved deployments: collateral swap contracts per provider and Comet
//! markets.
//!
//! Both tables are built once from [`SwapConfig`](super::SwapConfig) and are
//! read-only afterwards.

use crate::error::{SwapError, SwapResult};
use crate::providers::LoanProviderId;
use alloy::primitives::Address;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Collateral swap contract per (chain, loan provider).
///
/// A chain present with no address for a provider means the provider is not
/// deployed there; a chain absent from the table is not supported at all.
#[derive(Debug, Clone, Default)]
pub struct ProviderDeployments {
    chains: HashMap<u64, SmallVec<[(LoanProviderId, Address); 2]>>,
}

impl ProviderDeployments {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain, with no providers deployed yet.
    pub fn add_chain(&mut self, chain_id: u64) -> &mut Self {
        self.chains.entry(chain_id).or_default();
        self
    }

    /// Register a provider deployment, replacing any previous address.
    pub fn insert(&mut self, chain_id: u64, id: LoanProviderId, contract: Address) -> &mut Self {
        let entries = self.chains.entry(chain_id).or_default();
        match entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = contract,
            None => entries.push((id, contract)),
        }
        self
    }

    /// Whether the chain is configured.
    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Swap contract for a provider, `None` when not deployed on the chain.
    pub fn address(&self, chain_id: u64, id: LoanProviderId) -> SwapResult<Option<Address>> {
        let entries = self
            .chains
            .get(&chain_id)
            .ok_or(SwapError::UnsupportedChain(chain_id))?;
        Ok(entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, contract)| *contract))
    }

    /// Deployed providers on a chain, in ordinal order.
    pub fn deployed(&self, chain_id: u64) -> SwapResult<SmallVec<[(LoanProviderId, Address); 2]>> {
        let mut deployed = SmallVec::new();
        for id in LoanProviderId::ALL {
            if let Some(contract) = self.address(chain_id, id)? {
                deployed.push((id, contract));
            }
        }
        Ok(deployed)
    }
}

/// A Comet market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CometDeployment {
    /// Key such as `mainnet_usdc`
    pub comet_key: String,
    pub chain_id: u64,
    pub address: Address,
    /// Base asset symbol, e.g. `USDC`
    pub asset: String,
}

/// Split a Comet key into its network name and base asset symbol.
///
/// The network is everything before the last `_`, so keys like
/// `goerli_optimism_usdc` resolve to `goerli_optimism`.
pub fn split_comet_key(key: &str) -> Option<(&str, String)> {
    let (network, asset) = key.rsplit_once('_')?;
    if network.is_empty() || asset.is_empty() {
        return None;
    }
    Some((network, asset.to_uppercase()))
}

pub(super) fn parse_address(field: &str, value: &str) -> SwapResult<Address> {
    value.trim().parse().map_err(|_| SwapError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comet_key() {
        assert_eq!(split_comet_key("mainnet_usdc"), Some(("mainnet", "USDC".to_string())));
        assert_eq!(
            split_comet_key("goerli_optimism_weth"),
            Some(("goerli_optimism", "WETH".to_string()))
        );
        assert_eq!(split_comet_key("mainnet"), None);
        assert_eq!(split_comet_key("_usdc"), None);
    }

    #[test]
    fn test_unknown_chain_is_error() {
        let table = ProviderDeployments::new();
        assert!(matches!(
            table.address(1, LoanProviderId::Aave),
            Err(SwapError::UnsupportedChain(1))
        ));
    }

    #[test]
    fn test_deployed_in_ordinal_order() {
        let mut table = ProviderDeployments::new();
        table
            .insert(1, LoanProviderId::Aave, Address::repeat_byte(2))
            .insert(1, LoanProviderId::Equalizer, Address::repeat_byte(1))
            .add_chain(137);

        let deployed = table.deployed(1).unwrap();
        assert_eq!(deployed[0], (LoanProviderId::Equalizer, Address::repeat_byte(1)));
        assert_eq!(deployed[1], (LoanProviderId::Aave, Address::repeat_byte(2)));

        assert!(table.deployed(137).unwrap().is_empty());
        assert_eq!(table.address(137, LoanProviderId::Equalizer).unwrap(), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = ProviderDeployments::new();
        table.insert(1, LoanProviderId::Aave, Address::repeat_byte(2));
        table.insert(1, LoanProviderId::Aave, Address::repeat_byte(3));
        assert_eq!(table.deployed(1).unwrap().len(), 1);
        assert_eq!(
            table.address(1, LoanProviderId::Aave).unwrap(),
            Some(Address::repeat_byte(3))
        );
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("comet", "0xc3d688B66703497DAA19211EEdff47f25384cdc3").is_ok());
        assert!(matches!(
            parse_address("comet", "0x1234"),
            Err(SwapError::InvalidAddress { .. })
        ));
    }
}
