//! AAVE V3 flash loans: fixed premium, liquidity held by the aToken.

use super::{memoized_address, LoanProvider, LoanProviderId, LoanRequest};
use crate::error::{SwapError, SwapResult};
use crate::u256_math::apply_fee_bps;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use collateral_swap_chain::{read_contract, IAavePool, IWidoCollateralSwap, LedgerReader, IERC20};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Flash loans from the AAVE pool behind a collateral swap contract.
#[derive(Debug)]
pub struct AaveProvider {
    contract: Address,
    asset: Address,
    amount: U256,
    ledger: Arc<dyn LedgerReader>,
    pool: OnceCell<Address>,
    fee: OnceCell<U256>,
}

impl AaveProvider {
    pub fn new(contract: Address, request: &LoanRequest, ledger: Arc<dyn LedgerReader>) -> Self {
        Self {
            contract,
            asset: request.asset,
            amount: request.amount,
            ledger,
            pool: OnceCell::new(),
            fee: OnceCell::new(),
        }
    }

    /// Pool the swap contract borrows from.
    pub async fn pool(&self) -> SwapResult<Address> {
        memoized_address(&self.pool, || async {
            let pool = read_contract(
                self.ledger.as_ref(),
                self.contract,
                IWidoCollateralSwap::POOLCall {},
            )
            .await?
            ._0;
            debug!(contract = %self.contract, pool = %pool, "Resolved AAVE pool");
            Ok::<_, SwapError>(pool)
        })
        .await
    }
}

#[async_trait]
impl LoanProvider for AaveProvider {
    fn id(&self) -> LoanProviderId {
        LoanProviderId::Aave
    }

    fn contract(&self) -> Address {
        self.contract
    }

    async fn can_be_used(&self) -> SwapResult<bool> {
        if self.amount.is_zero() {
            return Ok(false);
        }
        let ledger = self.ledger.as_ref();
        let pool = self.pool().await?;

        let reserves = read_contract(ledger, pool, IAavePool::getReservesListCall {})
            .await?
            ._0;
        if !reserves.contains(&self.asset) {
            debug!(asset = %self.asset, "Asset is not an AAVE reserve");
            return Ok(false);
        }

        let reserve = read_contract(
            ledger,
            pool,
            IAavePool::getReserveDataCall { asset: self.asset },
        )
        .await?
        ._0;
        let available = read_contract(
            ledger,
            self.asset,
            IERC20::balanceOfCall {
                account: reserve.aTokenAddress,
            },
        )
        .await?
        ._0;

        debug!(
            asset = %self.asset,
            available = %available,
            requested = %self.amount,
            "AAVE liquidity"
        );
        Ok(available > self.amount)
    }

    async fn compute_fee(&self) -> SwapResult<U256> {
        let pool = self.pool().await?;
        let premium_bps = read_contract(
            self.ledger.as_ref(),
            pool,
            IAavePool::FLASHLOAN_PREMIUM_TOTALCall {},
        )
        .await?
        ._0;
        let fee_bps = U256::from(premium_bps);
        let fee = apply_fee_bps(self.amount, fee_bps).ok_or(SwapError::FeeOverflow {
            amount: self.amount,
            fee_bps,
        })?;
        debug!(premium_bps = premium_bps, fee = %fee, "AAVE flash loan fee");
        Ok(fee)
    }

    fn fee_cell(&self) -> &OnceCell<U256> {
        &self.fee
    }
}
