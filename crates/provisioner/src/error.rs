//! Error types for the provisioner

use alloy_primitives::{Address, B256};
use basket_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Bad input to the pure position and parameter math. Always raised before
/// any transaction is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("Token {0} cannot be paired with itself")]
    IdenticalTokens(Address),

    #[error("Range too narrow: tick_lower {tick_lower} >= tick_upper {tick_upper}")]
    RangeTooNarrow { tick_lower: i32, tick_upper: i32 },

    #[error("Desired amounts fund zero liquidity")]
    InsufficientAmounts,

    #[error("Invalid slippage {0} bps: must be below 10000")]
    InvalidSlippage(u32),

    #[error("Deadline {deadline} is not after current time {now}")]
    DeadlineInPast { deadline: u64, now: u64 },

    #[error("Wrapped native token {0} is not part of the pool")]
    NativeNotInPair(Address),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// The chain rejected or contradicted a step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Pool already exists at {0}")]
    PoolAlreadyExists(Address),

    #[error("No contract deployed at pool address {0}")]
    PoolNotFound(Address),

    #[error("Pool {0} has not been initialized")]
    PoolNotInitialized(Address),

    #[error("Factory created pool {actual}, expected {expected}")]
    PoolAddressMismatch { expected: Address, actual: Address },

    #[error("Transaction {hash} reverted")]
    TransactionReverted { hash: B256 },
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::MalformedResponse(err.to_string())
    }
}

impl From<alloy_sol_types::Error> for NetworkError {
    fn from(err: alloy_sol_types::Error) -> Self {
        NetworkError::MalformedResponse(err.to_string())
    }
}

impl From<MathError> for ProvisionError {
    fn from(err: MathError) -> Self {
        ProvisionError::Validation(ValidationError::Math(err))
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
