//! Deterministic pool address resolution

use alloy_primitives::{keccak256, Address};
use basket_types::{FeeTier, PoolKey, POOL_INIT_CODE_HASH};

use crate::error::{ProvisionResult, ValidationError};

/// Address of the pool for `token_a`/`token_b` at `fee`, as deployed by `factory`.
///
/// The pair is sorted first, so argument order does not matter.
pub fn compute_pool_address(
    factory: Address,
    token_a: Address,
    token_b: Address,
    fee: FeeTier,
) -> ProvisionResult<Address> {
    let key = PoolKey::new(token_a, token_b, fee).ok_or(ValidationError::IdenticalTokens(token_a))?;
    Ok(pool_address_for_key(factory, &key))
}

/// CREATE2 address for an already canonical key
pub fn pool_address_for_key(factory: Address, key: &PoolKey) -> Address {
    // abi.encode(token0, token1, uint24 fee)
    let mut encoded = [0u8; 96];
    encoded[12..32].copy_from_slice(key.token0.as_slice());
    encoded[44..64].copy_from_slice(key.token1.as_slice());
    encoded[92..96].copy_from_slice(&key.fee.fee().to_be_bytes());

    factory.create2(keccak256(encoded), POOL_INIT_CODE_HASH)
}
