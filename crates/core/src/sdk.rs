//! SDK facade: one Comet market, one user.

use crate::collaterals::{self, pick_asset, Asset, UserAsset};
use crate::config::{CometDeployment, ProviderDeployments, SwapConfig};
use crate::error::{SwapError, SwapResult};
use crate::position::{self, Position};
use crate::providers::{select_best_provider, LoanRequest, SelectedProvider};
use crate::route::{CollateralSwapRoute, FeeLeg, SwapFees};
use crate::signatures::{sign_authorizations, signature_params};
use alloy::primitives::{Address, B256, U256};
use collateral_swap_api::{CoingeckoClient, QuoteRequest, WidoClient};
use collateral_swap_chain::{
    encode_swap_collateral, AuthorizationSigs, LedgerReader, TransactionSender, WidoSwap,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Collateral swaps for `user` on a single Comet market.
#[derive(Debug)]
pub struct CollateralSwapSdk {
    comet: CometDeployment,
    deployments: ProviderDeployments,
    ledger: Arc<dyn LedgerReader>,
    user: Address,
    wido: WidoClient,
    prices: CoingeckoClient,
}

impl CollateralSwapSdk {
    /// Comet markets available in the configuration.
    pub fn deployments(config: &SwapConfig) -> SwapResult<Vec<CometDeployment>> {
        config.comet_deployments()
    }

    /// Create an SDK for the Comet identified by `comet_key`.
    pub fn new(
        config: &SwapConfig,
        comet_key: &str,
        user: Address,
        ledger: Arc<dyn LedgerReader>,
    ) -> SwapResult<Self> {
        let comet = config.comet(comet_key)?;
        let deployments = config.provider_deployments()?;

        let wido = match config.api.wido_url.as_deref() {
            Some(url) if !url.is_empty() => WidoClient::with_base_url(url),
            _ => WidoClient::new(),
        };
        let prices = match config.api.coingecko_url.as_deref() {
            Some(url) if !url.is_empty() => CoingeckoClient::with_base_url(url),
            _ => CoingeckoClient::new(),
        };

        info!(
            comet = %comet.comet_key,
            chain_id = comet.chain_id,
            address = %comet.address,
            user = %user,
            "Collateral swap SDK initialized"
        );
        Ok(Self {
            comet,
            deployments,
            ledger,
            user,
            wido,
            prices,
        })
    }

    pub fn comet(&self) -> &CometDeployment {
        &self.comet
    }

    pub fn user(&self) -> Address {
        self.user
    }

    /// Collaterals supported by the Comet.
    pub async fn supported_collaterals(&self) -> SwapResult<Vec<Asset>> {
        collaterals::supported_collaterals(self.ledger.as_ref(), self.comet.address).await
    }

    /// Supported collaterals with the user's balances.
    pub async fn user_collaterals(&self) -> SwapResult<Vec<UserAsset>> {
        collaterals::user_collaterals(self.ledger.as_ref(), self.comet.address, self.user).await
    }

    /// The user's current position.
    pub async fn current_position(&self) -> SwapResult<Position> {
        position::current_position(self.ledger.as_ref(), self.comet.address, self.user).await
    }

    /// The user's position once `route` is executed.
    pub async fn predicted_position(&self, route: &CollateralSwapRoute) -> SwapResult<Position> {
        position::predicted_position(self.ledger.as_ref(), self.comet.address, self.user, route)
            .await
    }

    /// Cheapest loan provider able to lend `amount` of `asset` on the Comet's chain.
    pub async fn best_provider(
        &self,
        asset: Address,
        amount: U256,
    ) -> SwapResult<Option<SelectedProvider>> {
        let request = LoanRequest::new(self.comet.chain_id, asset, amount);
        select_best_provider(&self.deployments, &request, self.ledger.clone()).await
    }

    /// Quote a swap of `amount` of `from_collateral` into `to_collateral`.
    #[instrument(skip(self), fields(comet = %self.comet.comet_key))]
    pub async fn collateral_swap_route(
        &self,
        from_collateral: Address,
        to_collateral: Address,
        amount: U256,
    ) -> SwapResult<CollateralSwapRoute> {
        let chain_id = self.comet.chain_id;
        ensure_chain(chain_id, self.ledger.chain_id().await?)?;

        let collaterals = self.user_collaterals().await?;
        let from = pick_asset(&collaterals, from_collateral)?;
        let to = pick_asset(&collaterals, to_collateral)?;
        if amount > from.balance {
            return Err(SwapError::InsufficientBalance {
                requested: amount,
                available: from.balance,
            });
        }

        // initial quote to learn how much of the destination asset to borrow
        let request = QuoteRequest::new(chain_id, from.asset.address, to.asset.address, amount);
        let initial = self.wido.quote(&request).await.map_err(SwapError::Quote)?;
        let borrow_amount = initial.to_amount().map_err(SwapError::Quote)?;

        let provider = self
            .best_provider(to.asset.address, borrow_amount)
            .await?
            .ok_or(SwapError::NoLoanProvider {
                asset: to.asset.address,
                amount: borrow_amount,
            })?;

        let quote = self
            .wido
            .quote(&request.with_user(provider.contract))
            .await
            .map_err(SwapError::Quote)?;
        let token_manager = self
            .wido
            .token_spender(chain_id, from.asset.address, to.asset.address)
            .await
            .map_err(SwapError::Quote)?;

        let to_amount = quote.to_amount().map_err(SwapError::Quote)?;
        let min_to_amount = quote.min_to_amount().map_err(SwapError::Quote)?;

        let prices = self
            .prices
            .token_prices(chain_id, &[from.asset.address, to.asset.address])
            .await
            .map_err(SwapError::Prices)?;
        let fees = SwapFees::compute(
            FeeLeg {
                token: from.asset.address,
                decimals: from.asset.decimals,
            },
            amount,
            quote.fee_bps(),
            FeeLeg {
                token: to.asset.address,
                decimals: to.asset.decimals,
            },
            provider.fee,
            &prices,
        )?;

        info!(
            provider = %provider.id,
            supported = quote.is_supported,
            to_amount = %to_amount,
            min_to_amount = %min_to_amount,
            total_fees_usd = fees.total_usd,
            "Collateral swap route ready"
        );
        Ok(CollateralSwapRoute {
            is_supported: quote.is_supported,
            provider: provider.id,
            to: quote.to,
            data: quote.data,
            token_manager,
            from_collateral: from.asset.address,
            from_collateral_amount: amount,
            to_collateral: to.asset.address,
            to_collateral_amount: to_amount,
            to_collateral_min_amount: min_to_amount,
            price: quote.price,
            fees,
        })
    }

    /// Allow/revoke signatures for `manager` on the user's Comet account.
    pub async fn create_signatures(
        &self,
        sender: &TransactionSender,
        manager: Address,
    ) -> SwapResult<AuthorizationSigs> {
        let params =
            signature_params(self.ledger.as_ref(), self.comet.address, sender.address).await?;
        sign_authorizations(sender, &self.comet, manager, params)
    }

    /// Execute a quoted swap. Returns the confirmed transaction hash.
    #[instrument(
        skip(self, route, sender),
        fields(comet = %self.comet.comet_key, provider = %route.provider)
    )]
    pub async fn swap_collateral(
        &self,
        route: &CollateralSwapRoute,
        sender: &TransactionSender,
    ) -> SwapResult<B256> {
        let wallet_chain = sender
            .connected_chain_id()
            .await
            .map_err(SwapError::Transaction)?;
        ensure_chain(self.comet.chain_id, wallet_chain)?;
        ensure_chain(self.comet.chain_id, sender.chain_id())?;

        let contract = self
            .deployments
            .address(self.comet.chain_id, route.provider)?
            .ok_or(SwapError::UnexecutableRoute("loan provider not deployed on this chain"))?;
        let (router, call_data) = route
            .swap_call()
            .ok_or(SwapError::UnexecutableRoute("quote is not supported"))?;

        let sigs = self.create_signatures(sender, contract).await?;
        let calldata = encode_swap_collateral(
            (route.from_collateral, route.from_collateral_amount),
            (route.to_collateral, route.to_collateral_min_amount),
            sigs.allow,
            sigs.revoke,
            WidoSwap {
                router,
                tokenManager: route.token_manager,
                callData: call_data.clone(),
            },
            self.comet.address,
        );

        debug!(contract = %contract, calldata_len = calldata.len(), "Submitting collateral swap");
        sender
            .send_transaction(contract, calldata, U256::ZERO)
            .await
            .map_err(SwapError::Transaction)
    }
}

/// A wallet or ledger must be on the Comet's chain.
fn ensure_chain(expected: u64, actual: u64) -> SwapResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SwapError::WrongChain { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaterals::tests::{comet_ledger, COMET, WETH};
    use crate::providers::LoanProviderId;
    use crate::testing::{ret, MockLedger};
    use alloy::sol_types::SolValue;
    use collateral_swap_chain::{IComet, IERC3156FlashLender, IWidoCollateralSwap};

    const USER: Address = Address::repeat_byte(0x99);
    const EQUALIZER_SWAP: Address = Address::repeat_byte(0x10);
    const LENDER: Address = Address::repeat_byte(0x11);

    fn config() -> SwapConfig {
        let content = format!(
            r#"
            [[networks]]
            chain_id = 1
            name = "mainnet"
            rpc_url = "http://localhost:8545"

            [networks.loan_providers]
            equalizer = "{EQUALIZER_SWAP}"

            [[comets]]
            key = "mainnet_usdc"
            address = "{COMET}"

            [api]
            wido_url = "http://127.0.0.1:1"
            coingecko_url = "http://127.0.0.1:1"
            "#
        );
        SwapConfig::from_toml(&content).unwrap()
    }

    fn sdk(ledger: MockLedger) -> CollateralSwapSdk {
        CollateralSwapSdk::new(&config(), "mainnet_usdc", USER, Arc::new(ledger)).unwrap()
    }

    #[test]
    fn test_unknown_comet_rejected() {
        let ledger = Arc::new(MockLedger::new(1));
        let result = CollateralSwapSdk::new(&config(), "polygon_usdc", USER, ledger);
        assert!(matches!(result, Err(SwapError::UnsupportedComet(_))));
    }

    #[test]
    fn test_deployments() {
        let deployments = CollateralSwapSdk::deployments(&config()).unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].address, COMET);
        assert_eq!(deployments[0].asset, "USDC");
    }

    #[test]
    fn test_ensure_chain() {
        assert!(ensure_chain(1, 1).is_ok());
        assert!(matches!(
            ensure_chain(1, 137),
            Err(SwapError::WrongChain { expected: 1, actual: 137 })
        ));
    }

    #[tokio::test]
    async fn test_supported_collaterals() {
        let collaterals = sdk(comet_ledger()).supported_collaterals().await.unwrap();
        assert_eq!(collaterals.len(), 2);
        assert_eq!(collaterals[0].address, WETH);
    }

    #[tokio::test]
    async fn test_best_provider_uses_configured_deployments() {
        let ledger = MockLedger::new(1);
        ledger
            .on::<IWidoCollateralSwap::equalizerProviderCall>(EQUALIZER_SWAP, ret(LENDER))
            .on::<IERC3156FlashLender::maxFlashLoanCall>(LENDER, ret(U256::from(1_000)))
            .on::<IERC3156FlashLender::flashFeeCall>(LENDER, ret(U256::from(5)));
        let sdk = sdk(ledger);

        let selected = sdk.best_provider(WETH, U256::from(100)).await.unwrap().unwrap();
        assert_eq!(selected.id, LoanProviderId::Equalizer);
        assert_eq!(selected.contract, EQUALIZER_SWAP);
        assert_eq!(selected.fee, U256::from(5));

        assert!(sdk.best_provider(WETH, U256::from(1_000)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_route_rejects_amount_above_balance() {
        let ledger = comet_ledger();
        ledger.on::<IComet::userCollateralCall>(COMET, (10u128, 0u128).abi_encode_params());

        let result = sdk(ledger)
            .collateral_swap_route(WETH, crate::collaterals::tests::WBTC, U256::from(11))
            .await;
        assert!(matches!(result, Err(SwapError::InsufficientBalance { .. })));
    }

    #[tokio::test]
    async fn test_route_rejects_ledger_on_other_chain() {
        let ledger = MockLedger::new(137);
        let sdk = sdk(ledger);

        let result = sdk
            .collateral_swap_route(WETH, Address::repeat_byte(0x77), U256::from(1))
            .await;
        assert!(matches!(result, Err(SwapError::WrongChain { expected: 1, actual: 137 })));
    }

    #[tokio::test]
    async fn test_route_rejects_unknown_collateral() {
        let ledger = comet_ledger();
        ledger.on::<IComet::userCollateralCall>(COMET, (10u128, 0u128).abi_encode_params());

        let result = sdk(ledger)
            .collateral_swap_route(WETH, Address::repeat_byte(0x77), U256::from(1))
            .await;
        assert!(matches!(result, Err(SwapError::CollateralNotSupported(_))));
    }
}
