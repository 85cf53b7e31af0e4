//! ERC-3156 flash lender interface (Equalizer and compatible lenders).

use alloy::sol;

sol! {
    /// ERC-3156 flash lender
    interface IERC3156FlashLender {
        /// The amount of currency available to be lent.
        function maxFlashLoan(address token) external view returns (uint256);

        /// The fee to be charged for a given loan.
        function flashFee(address token, uint256 amount) external view returns (uint256);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_selectors_match_standard() {
        assert_eq!(
            hex::encode(IERC3156FlashLender::maxFlashLoanCall::SELECTOR),
            "613255ab"
        );
        assert_eq!(
            hex::encode(IERC3156FlashLender::flashFeeCall::SELECTOR),
            "d9d98ce4"
        );
    }
}
