//! Equalizer flash loans through the ERC-3156 lender interface.

use super::{memoized_address, LoanProvider, LoanProviderId, LoanRequest};
use crate::error::{SwapError, SwapResult};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use collateral_swap_chain::{read_contract, IERC3156FlashLender, IWidoCollateralSwap, LedgerReader};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Flash loans from the Equalizer lender behind a collateral swap contract.
#[derive(Debug)]
pub struct EqualizerProvider {
    contract: Address,
    asset: Address,
    amount: U256,
    ledger: Arc<dyn LedgerReader>,
    lender: OnceCell<Address>,
    fee: OnceCell<U256>,
}

impl EqualizerProvider {
    pub fn new(contract: Address, request: &LoanRequest, ledger: Arc<dyn LedgerReader>) -> Self {
        Self {
            contract,
            asset: request.asset,
            amount: request.amount,
            ledger,
            lender: OnceCell::new(),
            fee: OnceCell::new(),
        }
    }

    /// Lender the swap contract borrows from.
    pub async fn lender(&self) -> SwapResult<Address> {
        memoized_address(&self.lender, || async {
            let lender = read_contract(
                self.ledger.as_ref(),
                self.contract,
                IWidoCollateralSwap::equalizerProviderCall {},
            )
            .await?
            ._0;
            debug!(contract = %self.contract, lender = %lender, "Resolved Equalizer lender");
            Ok::<_, SwapError>(lender)
        })
        .await
    }
}

#[async_trait]
impl LoanProvider for EqualizerProvider {
    fn id(&self) -> LoanProviderId {
        LoanProviderId::Equalizer
    }

    fn contract(&self) -> Address {
        self.contract
    }

    async fn can_be_used(&self) -> SwapResult<bool> {
        if self.amount.is_zero() {
            return Ok(false);
        }
        let lender = self.lender().await?;
        let max = read_contract(
            self.ledger.as_ref(),
            lender,
            IERC3156FlashLender::maxFlashLoanCall { token: self.asset },
        )
        .await?
        ._0;

        debug!(
            asset = %self.asset,
            max_flash_loan = %max,
            requested = %self.amount,
            "Equalizer capacity"
        );
        // zero means the lender does not support the token
        Ok(!max.is_zero() && max > self.amount)
    }

    async fn compute_fee(&self) -> SwapResult<U256> {
        let lender = self.lender().await?;
        let fee = read_contract(
            self.ledger.as_ref(),
            lender,
            IERC3156FlashLender::flashFeeCall {
                token: self.asset,
                amount: self.amount,
            },
        )
        .await?
        ._0;
        debug!(fee = %fee, "Equalizer flash loan fee");
        Ok(fee)
    }

    fn fee_cell(&self) -> &OnceCell<U256> {
        &self.fee
    }
}
