//! AAVE V3 pool interface (flash loan subset).
//!
//! The collateral swap contract wired to AAVE points at the pool through its
//! `POOL()` getter; these bindings cover what is needed to price and size a
//! flash loan from that pool.

use alloy::sol;

sol! {
    /// AAVE V3 `ReserveData` with the configuration bitmap flattened to a word.
    #[derive(Debug, Default)]
    struct ReserveData {
        uint256 configuration;
        uint128 liquidityIndex;
        uint128 currentLiquidityRate;
        uint128 variableBorrowIndex;
        uint128 currentVariableBorrowRate;
        uint128 currentStableBorrowRate;
        uint40 lastUpdateTimestamp;
        uint16 id;
        address aTokenAddress;
        address stableDebtTokenAddress;
        address variableDebtTokenAddress;
        address interestRateStrategyAddress;
        uint128 accruedToTreasury;
        uint128 unbacked;
        uint128 isolationModeTotalDebt;
    }

    /// AAVE V3 Pool interface (subset for flash loans)
    interface IAavePool {
        /// Flash loan premium in basis points.
        function FLASHLOAN_PREMIUM_TOTAL() external view returns (uint128);

        /// Every asset listed as a reserve.
        function getReservesList() external view returns (address[] memory);

        function getReserveData(address asset) external view returns (ReserveData memory);
    }
}
