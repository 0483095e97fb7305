//! # Tick Math
//!
//! Conversions between ticks and Q64.96 sqrt prices, bit-exact with the
//! on-chain pool implementation, plus snapping ticks onto a spacing grid.

use alloy_primitives::U256;
use basket_types::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};

use crate::error::{MathError, MathResult};

/// sqrt(1.0001)^-(2^i) in Q128.128 for i = 1..=19. Bit 0 is handled separately.
const SQRT_RATIO_MULTIPLIERS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

/// sqrt(1.0001)^-1 in Q128.128
const SQRT_RATIO_TICK_ONE: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Get the Q64.96 sqrt price at `tick`
pub fn get_sqrt_ratio_at_tick(tick: i32) -> MathResult<U256> {
    if !is_tick_valid(tick) {
        return Err(MathError::TickOutOfRange(tick));
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(SQRT_RATIO_TICK_ONE)
    } else {
        U256::from(1u8) << 128
    };

    for (i, multiplier) in SQRT_RATIO_MULTIPLIERS.iter().enumerate() {
        if abs_tick & (0x2 << i) != 0 {
            ratio = (ratio * U256::from(*multiplier)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result is never below the true price
    let remainder: U256 = ratio % (U256::from(1u8) << 32);
    let mut sqrt_price = ratio >> 32;
    if !remainder.is_zero() {
        sqrt_price += U256::from(1u8);
    }

    Ok(sqrt_price)
}

/// Get the greatest tick whose sqrt price is at or below `sqrt_price_x96`
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> MathResult<i32> {
    if !is_sqrt_price_valid(sqrt_price_x96) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price_x96));
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

/// Round `tick` to the nearest multiple of `tick_spacing`.
///
/// Exact midpoints round toward zero. A result that would leave the global
/// tick range is moved one spacing back inside it.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> MathResult<i32> {
    if tick_spacing <= 0 {
        return Err(MathError::InvalidSpacing(tick_spacing));
    }
    if !is_tick_valid(tick) {
        return Err(MathError::TickOutOfRange(tick));
    }

    let tick = i64::from(tick);
    let spacing = i64::from(tick_spacing);

    let quotient = tick / spacing;
    let remainder = tick % spacing;
    let mut rounded = if remainder.abs() * 2 > spacing {
        (quotient + tick.signum()) * spacing
    } else {
        quotient * spacing
    };

    if rounded < i64::from(MIN_TICK) {
        rounded += spacing;
    } else if rounded > i64::from(MAX_TICK) {
        rounded -= spacing;
    }

    i32::try_from(rounded).map_err(|_| MathError::TickOutOfRange(tick as i32))
}

/// Check if a tick is within the supported range
pub fn is_tick_valid(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Check if a Q64.96 sqrt price can be used to initialize a pool
pub fn is_sqrt_price_valid(sqrt_price_x96: U256) -> bool {
    sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO
}
