//! ABI bindings for the contracts the provisioner talks to

use alloy_sol_types::sol;

sol! {
    /// Token surface used for balances, approvals, and metadata
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function approve(address spender, uint256 amount) external returns (bool success);
        function decimals() external view returns (uint8 value);
        function symbol() external view returns (string value);
        function name() external view returns (string value);
    }

    /// Wrapped native asset
    interface IWETH9 {
        function deposit() external payable;
    }

    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
        function createPool(address tokenA, address tokenB, uint24 fee) external returns (address pool);
    }

    interface IUniswapV3Pool {
        function initialize(uint160 sqrtPriceX96) external;
        function liquidity() external view returns (uint128 value);
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }

    interface INonfungiblePositionManager {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Desired;
            uint256 amount1Desired;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
            uint256 deadline;
        }

        function mint(MintParams calldata params) external payable returns (
            uint256 tokenId,
            uint128 liquidity,
            uint256 amount0,
            uint256 amount1
        );

        /// Returns any native value left over after a native-funded mint
        function refundETH() external payable;

        function multicall(bytes[] calldata data) external payable returns (bytes[] memory results);
    }
}
