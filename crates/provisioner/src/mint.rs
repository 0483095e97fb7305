//! Slippage-bounded mint parameters for the position manager

use alloy_primitives::{aliases::{I24, U24}, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use basket_math::MathError;
use basket_types::{MintParameters, Position, BPS_DENOMINATOR};

use crate::contracts::INonfungiblePositionManager::{self, MintParams};
use crate::error::{ProvisionResult, ValidationError};

/// Caller choices for a mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOptions {
    /// Receiver of the position NFT
    pub recipient: Address,

    /// Maximum tolerated shortfall of each side, in basis points
    pub slippage_bps: u32,

    /// Seconds from now until the mint expires
    pub deadline_seconds: u64,

    /// Pay the side held as this wrapped native token with native value
    pub use_native: Option<Address>,
}

/// Build the bounded mint call for `position`.
///
/// `now` is the unix timestamp the deadline is resolved against.
pub fn build_mint_parameters(
    position: &Position,
    options: &MintOptions,
    now: u64,
) -> ProvisionResult<MintParameters> {
    if options.slippage_bps >= BPS_DENOMINATOR {
        return Err(ValidationError::InvalidSlippage(options.slippage_bps).into());
    }

    let deadline = now
        .checked_add(options.deadline_seconds)
        .ok_or(MathError::MathOverflow)?;
    if deadline <= now {
        return Err(ValidationError::DeadlineInPast { deadline, now }.into());
    }

    let amount0_min = minimum_amount(position.amount0, options.slippage_bps)?;
    let amount1_min = minimum_amount(position.amount1, options.slippage_bps)?;

    let value = match options.use_native {
        Some(wrapped) if wrapped == position.pool.token0 => position.amount0,
        Some(wrapped) if wrapped == position.pool.token1 => position.amount1,
        Some(wrapped) => return Err(ValidationError::NativeNotInPair(wrapped).into()),
        None => U256::ZERO,
    };

    let mint = INonfungiblePositionManager::mintCall {
        params: MintParams {
            token0: position.pool.token0,
            token1: position.pool.token1,
            fee: U24::from(position.pool.fee.fee()),
            tickLower: tick_param(position.tick_lower)?,
            tickUpper: tick_param(position.tick_upper)?,
            amount0Desired: position.amount0,
            amount1Desired: position.amount1,
            amount0Min: amount0_min,
            amount1Min: amount1_min,
            recipient: options.recipient,
            deadline: U256::from(deadline),
        },
    }
    .abi_encode();

    // Native-funded mints refund whatever the pool did not take
    let calldata = if value.is_zero() {
        Bytes::from(mint)
    } else {
        let refund = INonfungiblePositionManager::refundETHCall {}.abi_encode();
        let multicall = INonfungiblePositionManager::multicallCall {
            data: vec![Bytes::from(mint), Bytes::from(refund)],
        };
        Bytes::from(multicall.abi_encode())
    };

    Ok(MintParameters {
        recipient: options.recipient,
        deadline,
        slippage_bps: options.slippage_bps,
        amount0_desired: position.amount0,
        amount1_desired: position.amount1,
        amount0_min,
        amount1_min,
        value,
        calldata,
    })
}

/// desired * (10000 - slippage) / 10000
pub fn minimum_amount(desired: U256, slippage_bps: u32) -> ProvisionResult<U256> {
    let kept = U256::from(BPS_DENOMINATOR.saturating_sub(slippage_bps));
    let scaled = desired.checked_mul(kept).ok_or(MathError::MathOverflow)?;
    Ok(scaled / U256::from(BPS_DENOMINATOR))
}

fn tick_param(tick: i32) -> ProvisionResult<I24> {
    I24::try_from(tick).map_err(|_| MathError::TickOutOfRange(tick).into())
}
