//! # Full Math
//!
//! 512-bit intermediate multiply-divide so that `a * b / d` never loses
//! precision or silently overflows.

use alloy_primitives::{U256, U512};

use crate::error::{MathError, MathResult};

pub(crate) fn widen(value: U256) -> U512 {
    let limbs = value.as_limbs();
    U512::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

pub(crate) fn narrow(value: U512) -> MathResult<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return Err(MathError::MathOverflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// floor(a * b / denominator)
pub fn mul_div(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow(widen(a) * widen(b) / widen(denominator))
}

/// ceil(a * b / denominator)
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = widen(a) * widen(b);
    let denominator = widen(denominator);
    let mut result = product / denominator;
    if !(product % denominator).is_zero() {
        result += U512::from(1u8);
    }
    narrow(result)
}

/// ceil(a / b)
pub fn div_rounding_up(a: U256, b: U256) -> MathResult<U256> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1u8))
    }
}
