//! EIP-712 authorizations letting a collateral swap contract act on the
//! user's Comet account for a single transaction.
//!
//! Two signatures are produced: one allowing the manager at the current
//! nonce, one revoking it at the next nonce. The swap contract submits both
//! through `allowBySig`, so the permission never outlives the swap.

use crate::config::CometDeployment;
use crate::error::{SwapError, SwapResult};
use alloy::primitives::{Address, U256};
use collateral_swap_chain::{
    comet_domain, read_contract, Authorization, AuthorizationSig, AuthorizationSigs, IComet,
    LedgerReader, TransactionSender,
};
use tracing::debug;

/// Comet values the authorization domain and message depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    pub nonce: U256,
    pub name: String,
    pub version: String,
}

/// Read the user's nonce and the Comet's EIP-712 name and version.
pub async fn signature_params(
    ledger: &dyn LedgerReader,
    comet: Address,
    user: Address,
) -> SwapResult<SignatureParams> {
    let (nonce, name, version) = futures::try_join!(
        read_contract(ledger, comet, IComet::userNonceCall { account: user }),
        read_contract(ledger, comet, IComet::nameCall {}),
        read_contract(ledger, comet, IComet::versionCall {}),
    )?;

    Ok(SignatureParams {
        nonce: nonce._0,
        name: name._0,
        version: version._0,
    })
}

/// Allow and revoke messages for `manager` starting at `nonce`.
pub fn authorization_pair(
    owner: Address,
    manager: Address,
    nonce: U256,
) -> (Authorization, Authorization) {
    (
        Authorization::new(owner, manager, true, nonce),
        Authorization::new(owner, manager, false, nonce + U256::from(1)),
    )
}

/// Sign the allow/revoke pair with the sender's key.
pub fn sign_authorizations(
    sender: &TransactionSender,
    comet: &CometDeployment,
    manager: Address,
    params: SignatureParams,
) -> SwapResult<AuthorizationSigs> {
    let domain = comet_domain(params.name, params.version, comet.chain_id, comet.address);
    let (allow, revoke) = authorization_pair(sender.address, manager, params.nonce);

    let allow_sig = sender
        .sign_hash(&allow.signing_hash(&domain))
        .map_err(SwapError::Signing)?;
    let revoke_sig = sender
        .sign_hash(&revoke.signing_hash(&domain))
        .map_err(SwapError::Signing)?;

    debug!(
        owner = %sender.address,
        manager = %manager,
        nonce = %params.nonce,
        "Signed allow and revoke authorizations"
    );
    Ok(AuthorizationSigs {
        allow: AuthorizationSig::from_rsv(&allow_sig),
        revoke: AuthorizationSig::from_rsv(&revoke_sig),
    })
}
