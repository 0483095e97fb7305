//! Chain collaborators used by the provisioning orchestrator
//!
//! Each trait covers one contract surface. The orchestrator only needs a
//! [`ChainClient`], which every type implementing all of them gets for free,
//! so tests can swap in an in-memory chain.

pub mod rpc;

use alloy_primitives::{aliases::U160, Address, Bytes, B256, U256};
use async_trait::async_trait;
use basket_types::{PoolKey, PoolState, TokenIdentity};
use serde::Serialize;

use crate::error::ProvisionResult;

pub use rpc::JsonRpcClient;

/// Confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Price slot of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U160,
    pub tick: i32,
}

#[async_trait]
pub trait AccountClient: Send + Sync {
    /// Account every transaction is sent from
    fn sender(&self) -> Address;

    async fn chain_id(&self) -> ProvisionResult<u64>;

    async fn native_balance(&self, owner: Address) -> ProvisionResult<U256>;
}

#[async_trait]
pub trait TokenClient: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> ProvisionResult<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> ProvisionResult<TxReceipt>;

    /// Deposit `amount` of the native asset into the wrapper contract
    async fn wrap_native(&self, wrapper: Address, amount: U256) -> ProvisionResult<TxReceipt>;

    async fn token_identity(&self, chain_id: u64, token: Address) -> ProvisionResult<TokenIdentity>;
}

#[async_trait]
pub trait FactoryClient: Send + Sync {
    /// Pool registered for `key`, if any
    async fn get_pool(&self, factory: Address, key: &PoolKey) -> ProvisionResult<Option<Address>>;

    async fn create_pool(&self, factory: Address, key: &PoolKey) -> ProvisionResult<TxReceipt>;

    async fn initialize_pool(&self, pool: Address, sqrt_price_x96: U160) -> ProvisionResult<TxReceipt>;
}

#[async_trait]
pub trait PoolStateClient: Send + Sync {
    async fn liquidity(&self, pool: Address) -> ProvisionResult<u128>;

    async fn slot0(&self, pool: Address) -> ProvisionResult<Slot0>;

    /// Snapshot of liquidity and price slot
    async fn pool_state(&self, pool: Address) -> ProvisionResult<PoolState> {
        let (liquidity, slot0) = tokio::try_join!(self.liquidity(pool), self.slot0(pool))?;
        Ok(PoolState {
            liquidity,
            sqrt_price_x96: slot0.sqrt_price_x96,
            tick: slot0.tick,
        })
    }
}

#[async_trait]
pub trait PositionManagerClient: Send + Sync {
    /// Send an opaque call to the position manager and wait for it to confirm
    async fn submit(&self, position_manager: Address, calldata: Bytes, value: U256) -> ProvisionResult<TxReceipt>;
}

/// Everything the orchestrator talks to
pub trait ChainClient:
    AccountClient + TokenClient + FactoryClient + PoolStateClient + PositionManagerClient
{
}

impl<T> ChainClient for T where
    T: AccountClient + TokenClient + FactoryClient + PoolStateClient + PositionManagerClient
{
}
