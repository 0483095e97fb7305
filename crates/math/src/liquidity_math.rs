//! # Liquidity Math
//!
//! Conversions between token amounts and liquidity for a position bounded by
//! two sqrt prices.

use alloy_primitives::U256;
use basket_types::{Q96, RESOLUTION};

use crate::error::{MathError, MathResult};
use crate::full_math::{div_rounding_up, mul_div, mul_div_rounding_up, narrow, widen};
use crate::tick_math::get_sqrt_ratio_at_tick;

fn sorted(sqrt_ratio_a_x96: U256, sqrt_ratio_b_x96: U256) -> (U256, U256) {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    }
}

// ============================================================================
// Liquidity -> Amounts
// ============================================================================

/// Amount of token0 spanned by `liquidity` between two sqrt prices
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> MathResult<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_lower.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_upper - sqrt_lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, sqrt_upper)?, sqrt_lower)
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_upper)? / sqrt_lower)
    }
}

/// Amount of token1 spanned by `liquidity` between two sqrt prices
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> MathResult<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_upper - sqrt_lower, Q96)
    } else {
        mul_div(liquidity, sqrt_upper - sqrt_lower, Q96)
    }
}

/// Token amounts needed to mint `liquidity` in `[tick_lower, tick_upper)` at the
/// given pool price, rounded up in the pool's favor
pub fn get_amounts_for_liquidity(
    sqrt_price_x96: U256,
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> MathResult<(U256, U256)> {
    let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

    if tick_current < tick_lower {
        Ok((get_amount0_delta(sqrt_lower, sqrt_upper, liquidity, true)?, U256::ZERO))
    } else if tick_current < tick_upper {
        Ok((
            get_amount0_delta(sqrt_price_x96, sqrt_upper, liquidity, true)?,
            get_amount1_delta(sqrt_lower, sqrt_price_x96, liquidity, true)?,
        ))
    } else {
        Ok((U256::ZERO, get_amount1_delta(sqrt_lower, sqrt_upper, liquidity, true)?))
    }
}

// ============================================================================
// Amounts -> Liquidity
// ============================================================================

/// Liquidity bought by `amount0` between two sqrt prices, computed without
/// intermediate rounding
pub fn max_liquidity_for_amount0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> MathResult<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_lower == sqrt_upper {
        return Err(MathError::DivisionByZero);
    }

    let numerator = widen(amount0)
        .checked_mul(widen(sqrt_lower))
        .and_then(|v| v.checked_mul(widen(sqrt_upper)))
        .ok_or(MathError::MathOverflow)?;
    let denominator = widen(Q96) * widen(sqrt_upper - sqrt_lower);

    narrow(numerator / denominator)
}

/// Liquidity bought by `amount1` between two sqrt prices
pub fn max_liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> MathResult<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    mul_div(amount1, Q96, sqrt_upper - sqrt_lower)
}

/// Maximum liquidity that `amount0` and `amount1` can fund in the range at the
/// current price. Below the range only token0 is used, above it only token1,
/// and inside it the scarcer side binds.
pub fn max_liquidity_for_amounts(
    sqrt_price_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> MathResult<u128> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    let liquidity = if sqrt_price_x96 <= sqrt_lower {
        max_liquidity_for_amount0(sqrt_lower, sqrt_upper, amount0)?
    } else if sqrt_price_x96 < sqrt_upper {
        let liquidity0 = max_liquidity_for_amount0(sqrt_price_x96, sqrt_upper, amount0)?;
        let liquidity1 = max_liquidity_for_amount1(sqrt_lower, sqrt_price_x96, amount1)?;
        liquidity0.min(liquidity1)
    } else {
        max_liquidity_for_amount1(sqrt_lower, sqrt_upper, amount1)?
    };

    u128::try_from(liquidity).map_err(|_| MathError::MathOverflow)
}
