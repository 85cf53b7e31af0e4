//! Common contract interfaces shared across protocols.

use alloy::sol;

// ERC20 interface for token metadata and liquidity checks
sol! {
    /// Standard ERC20 interface (read-only subset)
    #[derive(Debug)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}
