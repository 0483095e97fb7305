//! Error types for price and liquidity math

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math overflow")]
    MathOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid ratio: both amounts must be non-zero")]
    InvalidRatio,

    #[error("Invalid tick spacing {0}: must be positive")]
    InvalidSpacing(i32),

    #[error("Tick {0} is outside the supported range")]
    TickOutOfRange(i32),

    #[error("Sqrt price {0} is outside the supported range")]
    SqrtPriceOutOfBounds(U256),
}

pub type MathResult<T> = Result<T, MathError>;
