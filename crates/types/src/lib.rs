/// Shared types for basket token liquidity provisioning
///
/// This crate provides the value objects, constants, and fee tier table
/// used by the math crate and the provisioner.

pub mod constants;
pub mod pool;
pub mod position;
pub mod token;

// Re-export all public types
pub use constants::*;
pub use pool::*;
pub use position::*;
pub use token::*;

/// Quantity of a fungible asset in its smallest unit
pub type Amount = alloy_primitives::U256;
