/// Liquidity positions and mint call parameters

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::pool::PoolKey;
use crate::Amount;

// ============================================================================
// Position
// ============================================================================

/// Concentrated-liquidity position computed from a pool snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    /// Pool the position belongs to
    pub pool: PoolKey,

    /// Position range, both on the pool's tick spacing grid
    pub tick_lower: i32,
    pub tick_upper: i32,

    /// Liquidity implied by the desired amounts
    pub liquidity: u128,

    /// Token amounts required to mint `liquidity` at the snapshot price
    pub amount0: Amount,
    pub amount1: Amount,
}

// ============================================================================
// Mint Parameters
// ============================================================================

/// Bounded call parameters for the position manager's mint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintParameters {
    /// Receiver of the position NFT
    pub recipient: Address,

    /// Absolute unix timestamp after which the mint reverts
    pub deadline: u64,

    /// Slippage tolerance in basis points
    pub slippage_bps: u32,

    pub amount0_desired: Amount,
    pub amount1_desired: Amount,
    pub amount0_min: Amount,
    pub amount1_min: Amount,

    /// Native asset attached to the transaction
    pub value: Amount,

    /// Encoded position manager call
    pub calldata: Bytes,
}
