//! # Sqrt Price Encoding
//!
//! Encodes an amount ratio as the Q64.96 square root price a pool is
//! initialized with.

use alloy_primitives::{U256, U512};

use crate::error::{MathError, MathResult};
use crate::full_math::{narrow, widen};
use crate::tick_math::is_sqrt_price_valid;

/// sqrt(amount_quote / amount_base) in Q64.96.
///
/// The ratio is shifted left by 192 bits before the integer square root so
/// the result keeps the full 96 fractional bits.
pub fn encode_sqrt_price(amount_quote: U256, amount_base: U256) -> MathResult<U256> {
    if amount_quote.is_zero() || amount_base.is_zero() {
        return Err(MathError::InvalidRatio);
    }

    let ratio_x192: U512 = (widen(amount_quote) << 192) / widen(amount_base);
    let sqrt_price = narrow(ratio_x192.root(2))?;

    if !is_sqrt_price_valid(sqrt_price) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price));
    }

    Ok(sqrt_price)
}
