//! Wido collateral swap contract interface.
//!
//! One contract is deployed per (chain, loan provider). Each exposes a getter
//! for the liquidity source it borrows from and the `swapCollateral` entry
//! point that withdraws, swaps and re-deposits in a single transaction.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    /// Collateral leg of a swap.
    #[derive(Debug)]
    struct Collateral {
        address addr;
        uint256 amount;
    }

    /// Split ECDSA signature.
    #[derive(Debug)]
    struct AuthorizationSig {
        uint8 v;
        bytes32 r;
        bytes32 s;
    }

    /// Allow and revoke authorizations for the Comet manager.
    #[derive(Debug)]
    struct AuthorizationSigs {
        AuthorizationSig allow;
        AuthorizationSig revoke;
    }

    /// Aggregator swap to run between withdraw and supply.
    #[derive(Debug)]
    struct WidoSwap {
        address router;
        address tokenManager;
        bytes callData;
    }

    interface IWidoCollateralSwap {
        /// AAVE pool used by the AAVE-backed deployment.
        function POOL() external view returns (address);

        /// ERC-3156 lender used by the Equalizer-backed deployment.
        function equalizerProvider() external view returns (address);

        function swapCollateral(
            Collateral existingCollateral,
            Collateral finalCollateral,
            AuthorizationSigs sigs,
            WidoSwap swap,
            address comet
        ) external;
    }
}

impl AuthorizationSig {
    /// Split a 65-byte `r || s || v` signature.
    pub fn from_rsv(bytes: &[u8; 65]) -> Self {
        Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }
}

/// Encode a `swapCollateral` call.
pub fn encode_swap_collateral(
    existing: (Address, U256),
    final_collateral: (Address, U256),
    allow: AuthorizationSig,
    revoke: AuthorizationSig,
    swap: WidoSwap,
    comet: Address,
) -> Bytes {
    let call = IWidoCollateralSwap::swapCollateralCall {
        existingCollateral: Collateral {
            addr: existing.0,
            amount: existing.1,
        },
        finalCollateral: Collateral {
            addr: final_collateral.0,
            amount: final_collateral.1,
        },
        sigs: AuthorizationSigs { allow, revoke },
        swap,
        comet,
    };
    Bytes::from(call.abi_encode())
}
