/// Fee tiers, pool keys, and pool state snapshots

use alloy_primitives::{Address, U160};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::token::sort_addresses;

// ============================================================================
// Fee Tiers
// ============================================================================

/// Fee level of a pool. The tick spacing is fixed by the tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Fee in hundredths of a basis point
    pub fn fee(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    pub fn from_fee(fee: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.fee() == fee)
    }
}

impl Default for FeeTier {
    fn default() -> Self {
        FeeTier::Medium
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeeTier::Lowest => "lowest",
            FeeTier::Low => "low",
            FeeTier::Medium => "medium",
            FeeTier::High => "high",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown fee tier '{0}' (expected lowest, low, medium, high or a fee of 100/500/3000/10000)")]
pub struct ParseFeeTierError(String);

impl FromStr for FeeTier {
    type Err = ParseFeeTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowest" => Ok(FeeTier::Lowest),
            "low" => Ok(FeeTier::Low),
            "medium" => Ok(FeeTier::Medium),
            "high" => Ok(FeeTier::High),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(FeeTier::from_fee)
                .ok_or_else(|| ParseFeeTierError(s.to_string())),
        }
    }
}

// ============================================================================
// Pool Identity and State
// ============================================================================

/// Canonical key of a pool: ordered token pair plus fee tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeTier,
}

impl PoolKey {
    /// Build a key from an unordered pair. Returns `None` for identical tokens.
    pub fn new(token_a: Address, token_b: Address, fee: FeeTier) -> Option<Self> {
        if token_a == token_b {
            return None;
        }
        let (token0, token1) = sort_addresses(token_a, token_b);
        Some(Self { token0, token1, fee })
    }

    pub fn tick_spacing(&self) -> i32 {
        self.fee.tick_spacing()
    }
}

/// Point-in-time snapshot of a pool's price and liquidity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PoolState {
    /// In-range liquidity
    pub liquidity: u128,

    /// Current sqrt price in Q64.96
    pub sqrt_price_x96: U160,

    /// Current tick
    pub tick: i32,
}

impl PoolState {
    /// An uninitialized pool reports a zero sqrt price
    pub fn is_initialized(&self) -> bool {
        !self.sqrt_price_x96.is_zero()
    }
}
