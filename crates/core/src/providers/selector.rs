//! Cheapest eligible loan provider selection.

use super::{LoanProvider, LoanProviderId, LoanProviders, LoanRequest};
use crate::config::ProviderDeployments;
use crate::error::SwapResult;
use alloy::primitives::{Address, U256};
use collateral_swap_chain::LedgerReader;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedProvider {
    pub id: LoanProviderId,
    /// Collateral swap contract wired to the provider
    pub contract: Address,
    pub fee: U256,
}

/// Pick the cheapest eligible provider in a single pass.
///
/// Ineligible providers are skipped without asking for their fee. A provider
/// replaces the current best only when strictly cheaper, so ties keep the
/// earlier one. Any ledger error aborts the selection.
pub async fn select_best(
    candidates: &[Box<dyn LoanProvider>],
) -> SwapResult<Option<&dyn LoanProvider>> {
    let mut best: Option<(&dyn LoanProvider, U256)> = None;

    for candidate in candidates {
        let provider = candidate.as_ref();
        if !provider.can_be_used().await? {
            debug!(provider = %provider.id(), "Loan provider cannot be used");
            continue;
        }

        let fee = provider.fee().await?;
        debug!(provider = %provider.id(), fee = %fee, "Loan provider eligible");

        match best {
            Some((_, best_fee)) if fee >= best_fee => {}
            _ => best = Some((provider, fee)),
        }
    }

    Ok(best.map(|(provider, _)| provider))
}

/// Select the best provider deployed on the request's chain.
///
/// Returns `Ok(None)` when no provider can service the request.
pub async fn select_best_provider(
    deployments: &ProviderDeployments,
    request: &LoanRequest,
    ledger: Arc<dyn LedgerReader>,
) -> SwapResult<Option<SelectedProvider>> {
    let providers = LoanProviders::new(deployments, request, ledger)?;
    let Some(best) = providers.best().await? else {
        info!(
            chain_id = request.chain_id,
            asset = %request.asset,
            amount = %request.amount,
            "No loan provider available"
        );
        return Ok(None);
    };

    let selected = SelectedProvider {
        id: best.id(),
        contract: best.contract(),
        fee: best.fee().await?,
    };
    info!(
        provider = %selected.id,
        contract = %selected.contract,
        fee = %selected.fee,
        "Selected loan provider"
    );
    Ok(Some(selected))
}
