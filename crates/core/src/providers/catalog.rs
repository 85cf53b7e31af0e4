//! Loan providers deployed on a chain for one request.

use super::{
    select_best, AaveProvider, EqualizerProvider, LoanProvider, LoanProviderId, LoanRequest,
};
use crate::config::ProviderDeployments;
use crate::error::SwapResult;
use collateral_swap_chain::LedgerReader;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Provider instances bound to a single [`LoanRequest`].
///
/// Built fresh per request; construction performs no ledger reads.
#[derive(Debug, Default)]
pub struct LoanProviders {
    providers: SmallVec<[Box<dyn LoanProvider>; 2]>,
}

impl LoanProviders {
    /// Instantiate every provider deployed on the request's chain, in
    /// ordinal order.
    pub fn new(
        deployments: &ProviderDeployments,
        request: &LoanRequest,
        ledger: Arc<dyn LedgerReader>,
    ) -> SwapResult<Self> {
        let mut providers: SmallVec<[Box<dyn LoanProvider>; 2]> = SmallVec::new();

        for (id, contract) in deployments.deployed(request.chain_id)? {
            let provider: Box<dyn LoanProvider> = match id {
                LoanProviderId::Equalizer => {
                    Box::new(EqualizerProvider::new(contract, request, ledger.clone()))
                }
                LoanProviderId::Aave => {
                    Box::new(AaveProvider::new(contract, request, ledger.clone()))
                }
            };
            providers.push(provider);
        }

        debug!(
            chain_id = request.chain_id,
            asset = %request.asset,
            amount = %request.amount,
            providers = providers.len(),
            "Loan providers loaded"
        );
        Ok(Self { providers })
    }

    /// Wrap an explicit list of providers, kept in the given order.
    pub fn from_providers(providers: impl IntoIterator<Item = Box<dyn LoanProvider>>) -> Self {
        Self {
            providers: providers.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn LoanProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Identities in evaluation order.
    pub fn ids(&self) -> Vec<LoanProviderId> {
        self.iter().map(|p| p.id()).collect()
    }

    /// Cheapest eligible provider, if any.
    pub async fn best(&self) -> SwapResult<Option<&dyn LoanProvider>> {
        select_best(&self.providers).await
    }
}
