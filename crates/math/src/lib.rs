/// Mathematical utilities for concentrated-liquidity provisioning
///
/// This crate provides tick and sqrt price conversions, full-precision
/// multiply-divide, and the amount/liquidity conversions used to size
/// positions. All operations return errors instead of wrapping.

pub mod error;
pub mod full_math;
pub mod liquidity_math;
pub mod sqrt_price;
pub mod tick_math;

// Re-export commonly used functions
pub use error::*;
pub use full_math::*;
pub use liquidity_math::*;
pub use sqrt_price::*;
pub use tick_math::*;
