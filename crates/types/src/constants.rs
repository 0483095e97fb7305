/// Protocol constants for concentrated-liquidity pools

use alloy_primitives::{b256, uint, B256, U256};

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Q96 fixed-point resolution in bits
pub const RESOLUTION: usize = 96;

/// Q96 fixed-point scale factor: 2^96
pub const Q96: U256 = uint!(0x1000000000000000000000000_U256);

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

// ============================================================================
// Tick and Price Constants
// ============================================================================

/// Minimum tick value
pub const MIN_TICK: i32 = -887_272;

/// Maximum tick value
pub const MAX_TICK: i32 = 887_272;

/// Sqrt price at MIN_TICK
pub const MIN_SQRT_RATIO: U256 = uint!(4295128739_U256);

/// Sqrt price at MAX_TICK
pub const MAX_SQRT_RATIO: U256 = uint!(1461446703485210103287273052203988822378723970342_U256);

// ============================================================================
// Deployment Constants
// ============================================================================

/// Init code hash of the pool contract, used for CREATE2 address derivation
pub const POOL_INIT_CODE_HASH: B256 =
    b256!("e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");
