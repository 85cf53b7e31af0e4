//! Compound III (Comet) interfaces.
//!
//! Covers the collateral, pricing and authorization reads the SDK performs,
//! plus the EIP-712 `Authorization` message Comet accepts through
//! `allowBySig`.

use alloy::primitives::{Address, B256, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

sol! {
    /// Per-collateral configuration as stored by Comet.
    #[derive(Debug, Default)]
    struct AssetInfo {
        uint8 offset;
        address asset;
        address priceFeed;
        uint64 scale;
        uint64 borrowCollateralFactor;
        uint64 liquidateCollateralFactor;
        uint64 liquidationFactor;
        uint128 supplyCap;
    }

    /// Comet interface (subset for collateral swaps)
    interface IComet {
        function numAssets() external view returns (uint8);
        function getAssetInfo(uint8 i) external view returns (AssetInfo memory);
        function userCollateral(address account, address asset)
            external view returns (uint128 balance, uint128 reserved);
        function collateralBalanceOf(address account, address asset)
            external view returns (uint128);
        function getPrice(address priceFeed) external view returns (uint256);
        function baseTokenPriceFeed() external view returns (address);
        function decimals() external view returns (uint8);
        function borrowBalanceOf(address account) external view returns (uint256);
        function name() external view returns (string memory);
        function version() external view returns (string memory);
        function userNonce(address account) external view returns (uint256);
    }

    /// EIP-712 message for `allowBySig`.
    #[derive(Debug)]
    struct Authorization {
        address owner;
        address manager;
        bool isAllowed;
        uint256 nonce;
        uint256 expiry;
    }
}

/// Signature expiry used for collateral swap authorizations.
pub const AUTHORIZATION_EXPIRY: u64 = 10_000_000_000;

/// EIP-712 domain of a Comet deployment.
pub fn comet_domain(name: String, version: String, chain_id: u64, comet: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Owned(name)),
        Some(Cow::Owned(version)),
        Some(U256::from(chain_id)),
        Some(comet),
        None,
    )
}

impl Authorization {
    /// Build an authorization message with the standard expiry.
    pub fn new(owner: Address, manager: Address, is_allowed: bool, nonce: U256) -> Self {
        Self {
            owner,
            manager,
            isAllowed: is_allowed,
            nonce,
            expiry: U256::from(AUTHORIZATION_EXPIRY),
        }
    }

    /// Hash to sign for the given domain.
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.eip712_signing_hash(domain)
    }
}
