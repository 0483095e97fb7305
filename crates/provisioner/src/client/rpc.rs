//! JSON-RPC chain client
//!
//! Talks to an execution node over HTTP. Transactions are sent with
//! `eth_sendTransaction`, so the node must manage the sender account
//! (a local fork or a dev node).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{aliases::{U160, U24}, Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use basket_types::{PoolKey, TokenIdentity};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    AccountClient, FactoryClient, PoolStateClient, PositionManagerClient, Slot0, TokenClient,
    TxReceipt,
};
use crate::contracts::{IUniswapV3Factory, IUniswapV3Pool, IWETH9, IERC20};
use crate::error::{NetworkError, ProtocolError, ProvisionResult};

/// HTTP JSON-RPC client bound to one sender account
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    sender: Address,
    poll_interval: Duration,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    block_number: U64,
    gas_used: U64,
    status: Option<U64>,
}

impl JsonRpcClient {
    /// Connect to `url`. Without an explicit sender the node's first account is used.
    pub async fn connect(
        url: impl Into<String>,
        sender: Option<Address>,
        poll_interval: Duration,
    ) -> ProvisionResult<Self> {
        let mut client = Self {
            http: reqwest::Client::new(),
            url: url.into(),
            sender: Address::ZERO,
            poll_interval,
            next_id: AtomicU64::new(1),
        };

        client.sender = match sender {
            Some(sender) => sender,
            None => {
                let accounts: Vec<Address> = client.request("eth_accounts", json!([])).await?;
                accounts.into_iter().next().ok_or_else(|| {
                    NetworkError::MalformedResponse("node manages no accounts".to_string())
                })?
            }
        };

        info!("Connected to {} as {}", client.url, client.sender);
        Ok(client)
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> ProvisionResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("RPC call {} #{}", method, id);

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(NetworkError::from)?
            .json()
            .await
            .map_err(NetworkError::from)?;

        if let Some(error) = response.error {
            return Err(NetworkError::Rpc {
                code: error.code,
                message: error.message,
            }
            .into());
        }

        Ok(serde_json::from_value(response.result).map_err(NetworkError::from)?)
    }

    /// Read-only call against the latest block
    async fn call(&self, to: Address, data: Vec<u8>) -> ProvisionResult<Bytes> {
        let tx = json!({ "from": self.sender, "to": to, "data": Bytes::from(data) });
        self.request("eth_call", json!([tx, "latest"])).await
    }

    async fn call_decode<C: SolCall>(&self, to: Address, call: &C) -> ProvisionResult<C::Return> {
        let data = self.call(to, call.abi_encode()).await?;
        decode::<C>(&data)
    }

    async fn send_and_confirm(&self, to: Address, data: Vec<u8>, value: U256) -> ProvisionResult<TxReceipt> {
        let tx = json!({
            "from": self.sender,
            "to": to,
            "data": Bytes::from(data),
            "value": value,
        });
        let hash: B256 = self.request("eth_sendTransaction", json!([tx])).await?;
        debug!("Sent transaction {}", hash);
        self.wait_for_receipt(hash).await
    }

    /// Poll until the transaction is mined. There is no timeout.
    async fn wait_for_receipt(&self, hash: B256) -> ProvisionResult<TxReceipt> {
        loop {
            let receipt: Option<RawReceipt> =
                self.request("eth_getTransactionReceipt", json!([hash])).await?;

            if let Some(receipt) = receipt {
                if receipt.status == Some(U64::ZERO) {
                    return Err(ProtocolError::TransactionReverted {
                        hash: receipt.transaction_hash,
                    }
                    .into());
                }
                return Ok(TxReceipt {
                    hash: receipt.transaction_hash,
                    block_number: receipt.block_number.to::<u64>(),
                    gas_used: receipt.gas_used.to::<u64>(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Pool reads fail with PoolNotFound when nothing is deployed at `pool`
    async fn pool_call<C: SolCall>(&self, pool: Address, call: &C) -> ProvisionResult<C::Return> {
        let data = self.call(pool, call.abi_encode()).await?;
        if data.is_empty() {
            return Err(ProtocolError::PoolNotFound(pool).into());
        }
        decode::<C>(&data)
    }
}

fn decode<C: SolCall>(data: &[u8]) -> ProvisionResult<C::Return> {
    Ok(C::abi_decode_returns(data, true).map_err(NetworkError::from)?)
}

#[async_trait]
impl AccountClient for JsonRpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> ProvisionResult<u64> {
        let chain_id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(chain_id.to::<u64>())
    }

    async fn native_balance(&self, owner: Address) -> ProvisionResult<U256> {
        self.request("eth_getBalance", json!([owner, "latest"])).await
    }
}

#[async_trait]
impl TokenClient for JsonRpcClient {
    async fn balance_of(&self, token: Address, owner: Address) -> ProvisionResult<U256> {
        let ret = self.call_decode(token, &IERC20::balanceOfCall { owner }).await?;
        Ok(ret.balance)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> ProvisionResult<TxReceipt> {
        let call = IERC20::approveCall { spender, amount };
        self.send_and_confirm(token, call.abi_encode(), U256::ZERO).await
    }

    async fn wrap_native(&self, wrapper: Address, amount: U256) -> ProvisionResult<TxReceipt> {
        self.send_and_confirm(wrapper, IWETH9::depositCall {}.abi_encode(), amount).await
    }

    async fn token_identity(&self, chain_id: u64, token: Address) -> ProvisionResult<TokenIdentity> {
        let (decimals, symbol, name) = tokio::try_join!(
            self.call_decode(token, &IERC20::decimalsCall {}),
            self.call_decode(token, &IERC20::symbolCall {}),
            self.call_decode(token, &IERC20::nameCall {}),
        )?;
        Ok(TokenIdentity::new(chain_id, token, decimals.value, symbol.value, name.value))
    }
}

#[async_trait]
impl FactoryClient for JsonRpcClient {
    async fn get_pool(&self, factory: Address, key: &PoolKey) -> ProvisionResult<Option<Address>> {
        let call = IUniswapV3Factory::getPoolCall {
            tokenA: key.token0,
            tokenB: key.token1,
            fee: U24::from(key.fee.fee()),
        };
        let ret = self.call_decode(factory, &call).await?;
        Ok((!ret.pool.is_zero()).then_some(ret.pool))
    }

    async fn create_pool(&self, factory: Address, key: &PoolKey) -> ProvisionResult<TxReceipt> {
        let call = IUniswapV3Factory::createPoolCall {
            tokenA: key.token0,
            tokenB: key.token1,
            fee: U24::from(key.fee.fee()),
        };
        self.send_and_confirm(factory, call.abi_encode(), U256::ZERO).await
    }

    async fn initialize_pool(&self, pool: Address, sqrt_price_x96: U160) -> ProvisionResult<TxReceipt> {
        let call = IUniswapV3Pool::initializeCall { sqrtPriceX96: sqrt_price_x96 };
        self.send_and_confirm(pool, call.abi_encode(), U256::ZERO).await
    }
}

#[async_trait]
impl PoolStateClient for JsonRpcClient {
    async fn liquidity(&self, pool: Address) -> ProvisionResult<u128> {
        let ret = self.pool_call(pool, &IUniswapV3Pool::liquidityCall {}).await?;
        Ok(ret.value)
    }

    async fn slot0(&self, pool: Address) -> ProvisionResult<Slot0> {
        let ret = self.pool_call(pool, &IUniswapV3Pool::slot0Call {}).await?;
        let tick = i32::try_from(ret.tick)
            .map_err(|_| NetworkError::MalformedResponse(format!("tick {} out of range", ret.tick)))?;
        Ok(Slot0 {
            sqrt_price_x96: ret.sqrtPriceX96,
            tick,
        })
    }
}

#[async_trait]
impl PositionManagerClient for JsonRpcClient {
    async fn submit(&self, position_manager: Address, calldata: Bytes, value: U256) -> ProvisionResult<TxReceipt> {
        self.send_and_confirm(position_manager, calldata.to_vec(), value).await
    }
}
