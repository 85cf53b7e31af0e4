//! Collaterals supported by a Comet market and the user's balances.

use crate::error::{SwapError, SwapResult};
use alloy::primitives::{Address, U256};
use collateral_swap_chain::{read_contract, AssetInfo, IComet, LedgerError, LedgerReader, IERC20};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, warn};

/// A collateral asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Token symbol
    pub name: String,
    pub address: Address,
    pub decimals: u8,
}

/// A collateral asset with the user's supplied balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAsset {
    #[serde(flatten)]
    pub asset: Asset,
    pub balance: U256,
}

/// Asset configuration for every collateral, in Comet index order.
pub async fn asset_infos(ledger: &dyn LedgerReader, comet: Address) -> SwapResult<Vec<AssetInfo>> {
    let num_assets = read_contract(ledger, comet, IComet::numAssetsCall {}).await?._0;
    debug!(comet = %comet, num_assets = num_assets, "Fetching asset infos");

    let infos = try_join_all((0..num_assets).map(|i| async move {
        read_contract(ledger, comet, IComet::getAssetInfoCall { i })
            .await
            .map(|r| r._0)
    }))
    .await?;
    Ok(infos)
}

/// Collaterals supported by a Comet, with token symbol and decimals.
pub async fn supported_collaterals(
    ledger: &dyn LedgerReader,
    comet: Address,
) -> SwapResult<Vec<Asset>> {
    let infos = asset_infos(ledger, comet).await?;
    try_join_all(infos.iter().map(|info| token_details(ledger, info.asset))).await
}

/// Supported collaterals with the user's balance of each.
pub async fn user_collaterals(
    ledger: &dyn LedgerReader,
    comet: Address,
    user: Address,
) -> SwapResult<Vec<UserAsset>> {
    let collaterals = supported_collaterals(ledger, comet).await?;

    let balances = try_join_all(collaterals.iter().map(|collateral| async move {
        read_contract(
            ledger,
            comet,
            IComet::userCollateralCall {
                account: user,
                asset: collateral.address,
            },
        )
        .await
        .map(|r| U256::from(r.balance))
    }))
    .await?;

    Ok(collaterals
        .into_iter()
        .zip(balances)
        .map(|(asset, balance)| UserAsset { asset, balance })
        .collect())
}

/// Find a collateral by address.
pub fn pick_asset(collaterals: &[UserAsset], address: Address) -> SwapResult<&UserAsset> {
    collaterals
        .iter()
        .find(|c| c.asset.address == address)
        .ok_or(SwapError::CollateralNotSupported(address))
}

async fn token_details(ledger: &dyn LedgerReader, token: Address) -> SwapResult<Asset> {
    let decimals = read_contract(ledger, token, IERC20::decimalsCall {}).await?._0;

    // some tokens (MKR) return bytes32 symbols
    let name = match read_contract(ledger, token, IERC20::symbolCall {}).await {
        Ok(r) => r._0,
        Err(LedgerError::Decode { reason, .. }) => {
            warn!(token = %token, reason = %reason, "Non-standard symbol, using address");
            token.to_string()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Asset {
        name,
        address: token,
        decimals,
    })
}
