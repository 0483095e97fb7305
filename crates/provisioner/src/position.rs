//! Sizing a symmetric position around the current pool price

use alloy_primitives::U256;
use basket_math::{
    get_amounts_for_liquidity, get_sqrt_ratio_at_tick, is_sqrt_price_valid, is_tick_valid,
    max_liquidity_for_amounts, nearest_usable_tick, MathError,
};
use basket_types::{PoolKey, PoolState, Position};
use tracing::debug;

use crate::error::{ProvisionResult, ValidationError};

/// Build a position spanning `tick_radius` spacings on each side of the
/// current tick, sized to the largest liquidity the desired amounts allow.
///
/// Pure: works only on the supplied snapshot.
pub fn build_position(
    pool: PoolKey,
    state: &PoolState,
    desired_amount0: U256,
    desired_amount1: U256,
    tick_radius: u32,
) -> ProvisionResult<Position> {
    let sqrt_price = U256::from(state.sqrt_price_x96);
    if !is_sqrt_price_valid(sqrt_price) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price).into());
    }

    let (tick_lower, tick_upper) = tick_range(state.tick, pool.tick_spacing(), tick_radius)?;

    let liquidity = max_liquidity_for_amounts(
        sqrt_price,
        get_sqrt_ratio_at_tick(tick_lower)?,
        get_sqrt_ratio_at_tick(tick_upper)?,
        desired_amount0,
        desired_amount1,
    )?;
    if liquidity == 0 {
        return Err(ValidationError::InsufficientAmounts.into());
    }

    let (amount0, amount1) =
        get_amounts_for_liquidity(sqrt_price, state.tick, tick_lower, tick_upper, liquidity)?;

    debug!(
        tick_lower,
        tick_upper,
        liquidity,
        %amount0,
        %amount1,
        "Sized position"
    );

    Ok(Position {
        pool,
        tick_lower,
        tick_upper,
        liquidity,
        amount0,
        amount1,
    })
}

/// Symmetric tick range around the usable tick nearest `tick_current`
pub fn tick_range(tick_current: i32, tick_spacing: i32, tick_radius: u32) -> ProvisionResult<(i32, i32)> {
    let center = nearest_usable_tick(tick_current, tick_spacing)?;
    let offset = i64::from(tick_radius) * i64::from(tick_spacing);

    let tick_lower = bounded_tick(i64::from(center) - offset)?;
    let tick_upper = bounded_tick(i64::from(center) + offset)?;

    if tick_lower >= tick_upper {
        return Err(ValidationError::RangeTooNarrow { tick_lower, tick_upper }.into());
    }

    Ok((tick_lower, tick_upper))
}

fn bounded_tick(tick: i64) -> ProvisionResult<i32> {
    match i32::try_from(tick) {
        Ok(tick) if is_tick_valid(tick) => Ok(tick),
        _ => {
            let saturated = tick.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            Err(MathError::TickOutOfRange(saturated).into())
        }
    }
}
