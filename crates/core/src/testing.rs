//! In-memory ledger for tests.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use collateral_swap_chain::{LedgerError, LedgerReader, LedgerResult};
use dashmap::DashMap;

/// ABI-encode a single return value.
pub(crate) fn ret<T: SolValue>(value: T) -> Vec<u8> {
    (value,).abi_encode_params()
}

/// Ledger answering `eth_call`s from canned responses.
///
/// Responses are matched on exact calldata first, then on (address,
/// selector). Every call is counted per (address, selector).
#[derive(Debug, Default)]
pub(crate) struct MockLedger {
    chain_id: u64,
    exact: DashMap<(Address, Bytes), Bytes>,
    by_selector: DashMap<(Address, [u8; 4]), Bytes>,
    failures: DashMap<(Address, [u8; 4]), String>,
    calls: DashMap<(Address, [u8; 4]), usize>,
}

impl MockLedger {
    pub(crate) fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Answer any call to `C` on `to`.
    pub(crate) fn on<C: SolCall>(&self, to: Address, output: Vec<u8>) -> &Self {
        self.by_selector.insert((to, C::SELECTOR), Bytes::from(output));
        self
    }

    /// Answer this exact call on `to`.
    pub(crate) fn on_call<C: SolCall>(&self, to: Address, call: C, output: Vec<u8>) -> &Self {
        self.exact
            .insert((to, Bytes::from(call.abi_encode())), Bytes::from(output));
        self
    }

    /// Make calls to `C` on `to` fail.
    pub(crate) fn fail<C: SolCall>(&self, to: Address, reason: &str) -> &Self {
        self.failures.insert((to, C::SELECTOR), reason.to_string());
        self
    }

    /// Number of calls made to `C` on `to`.
    pub(crate) fn calls<C: SolCall>(&self, to: Address) -> usize {
        self.calls
            .get(&(to, C::SELECTOR))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Total number of calls made.
    pub(crate) fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn call(&self, to: Address, calldata: Bytes) -> LedgerResult<Bytes> {
        let mut selector = [0u8; 4];
        if calldata.len() >= 4 {
            selector.copy_from_slice(&calldata[..4]);
        }
        *self.calls.entry((to, selector)).or_insert(0) += 1;

        if let Some(reason) = self.failures.get(&(to, selector)) {
            return Err(LedgerError::CallFailed {
                to,
                reason: reason.clone(),
            });
        }
        if let Some(output) = self.exact.get(&(to, calldata.clone())) {
            return Ok(output.clone());
        }
        if let Some(output) = self.by_selector.get(&(to, selector)) {
            return Ok(output.clone());
        }
        Err(LedgerError::CallFailed {
            to,
            reason: format!("no mock response for selector 0x{}", alloy::hex::encode(selector)),
        })
    }

    async fn chain_id(&self) -> LedgerResult<u64> {
        Ok(self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collateral_swap_chain::{read_contract, IERC20};

    #[tokio::test]
    async fn test_unmocked_call_names_selector() {
        let ledger = MockLedger::new(1);
        let token = Address::repeat_byte(0x10);

        let err = read_contract(&ledger, token, IERC20::decimalsCall {}).await.unwrap_err();
        assert!(err.to_string().contains("selector 0x313ce567"));
        assert_eq!(ledger.calls::<IERC20::decimalsCall>(token), 1);
    }
}
