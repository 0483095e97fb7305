//! Orchestrator scenarios against an in-memory chain

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{aliases::U160, Address, Bytes, B256, U256};
use async_trait::async_trait;
use basket_math::{encode_sqrt_price, get_tick_at_sqrt_ratio};
use basket_provisioner::client::{
    AccountClient, FactoryClient, PoolStateClient, PositionManagerClient, Slot0, TokenClient,
};
use basket_provisioner::{
    pool_address_for_key, NetworkConfig, PoolSetup, ProtocolError, ProvisionError,
    ProvisionOutcome, ProvisionRequest, Provisioner, ProvisioningSettings, ProvisioningStep,
    TxReceipt, ValidationError,
};
use basket_types::{FeeTier, PoolKey, PoolState, TokenIdentity};

const ETHER: u64 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tx {
    Approve { token: Address, amount: U256 },
    Wrap { amount: U256 },
    CreatePool,
    Initialize { pool: Address },
    Mint { value: U256 },
}

#[derive(Default)]
struct ChainState {
    native: U256,
    balances: HashMap<Address, U256>,
    registry: HashMap<PoolKey, Address>,
    pools: HashMap<Address, PoolState>,
    transactions: Vec<Tx>,
    calls: usize,
    pool_reads: usize,
    revert_mint: bool,
}

struct MockChain {
    sender: Address,
    chain_id: u64,
    state: Mutex<ChainState>,
}

impl MockChain {
    fn new() -> Self {
        Self {
            sender: Address::repeat_byte(0x42),
            chain_id: 31337,
            state: Mutex::new(ChainState::default()),
        }
    }

    fn fund(&self, native: U256, balances: &[(Address, U256)]) {
        let mut state = self.state.lock().unwrap();
        state.native = native;
        for (token, amount) in balances {
            state.balances.insert(*token, *amount);
        }
    }

    /// Register an initialized pool at the price implied by `amount1 / amount0`
    fn deploy_pool(&self, factory: Address, key: PoolKey, price: Option<(U256, U256)>) -> Address {
        let pool = pool_address_for_key(factory, &key);
        let pool_state = match price {
            Some((amount0, amount1)) => {
                let sqrt_price = encode_sqrt_price(amount1, amount0).unwrap();
                PoolState {
                    liquidity: 5 * ETHER as u128,
                    sqrt_price_x96: U160::from(sqrt_price),
                    tick: get_tick_at_sqrt_ratio(sqrt_price).unwrap(),
                }
            }
            None => PoolState::default(),
        };

        let mut state = self.state.lock().unwrap();
        state.registry.insert(key, pool);
        state.pools.insert(pool, pool_state);
        pool
    }

    fn transactions(&self) -> Vec<Tx> {
        self.state.lock().unwrap().transactions.clone()
    }

    fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    fn pool_reads(&self) -> usize {
        self.state.lock().unwrap().pool_reads
    }

    /// Make every mint land on chain and revert
    fn revert_mints(&self) {
        self.state.lock().unwrap().revert_mint = true;
    }

    fn receipt(state: &mut ChainState, tx: Tx) -> TxReceipt {
        state.transactions.push(tx);
        let n = state.transactions.len() as u64;
        TxReceipt {
            hash: B256::with_last_byte(n as u8),
            block_number: 100 + n,
            gas_used: 21_000,
        }
    }
}

#[async_trait]
impl AccountClient for MockChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> basket_provisioner::ProvisionResult<u64> {
        self.state.lock().unwrap().calls += 1;
        Ok(self.chain_id)
    }

    async fn native_balance(&self, _owner: Address) -> basket_provisioner::ProvisionResult<U256> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.native)
    }
}

#[async_trait]
impl TokenClient for MockChain {
    async fn balance_of(&self, token: Address, _owner: Address) -> basket_provisioner::ProvisionResult<U256> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.balances.get(&token).copied().unwrap_or_default())
    }

    async fn approve(
        &self,
        token: Address,
        _spender: Address,
        amount: U256,
    ) -> basket_provisioner::ProvisionResult<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        Ok(Self::receipt(&mut state, Tx::Approve { token, amount }))
    }

    async fn wrap_native(&self, wrapper: Address, amount: U256) -> basket_provisioner::ProvisionResult<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.native -= amount;
        *state.balances.entry(wrapper).or_default() += amount;
        Ok(Self::receipt(&mut state, Tx::Wrap { amount }))
    }

    async fn token_identity(&self, chain_id: u64, token: Address) -> basket_provisioner::ProvisionResult<TokenIdentity> {
        self.state.lock().unwrap().calls += 1;
        Ok(TokenIdentity::new(chain_id, token, 18, "BSKT", "Basket Index"))
    }
}

#[async_trait]
impl FactoryClient for MockChain {
    async fn get_pool(&self, _factory: Address, key: &PoolKey) -> basket_provisioner::ProvisionResult<Option<Address>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.registry.get(key).copied())
    }

    async fn create_pool(&self, factory: Address, key: &PoolKey) -> basket_provisioner::ProvisionResult<TxReceipt> {
        let pool = pool_address_for_key(factory, key);
        let mut state = self.state.lock().unwrap();
        state.registry.insert(*key, pool);
        state.pools.insert(pool, PoolState::default());
        Ok(Self::receipt(&mut state, Tx::CreatePool))
    }

    async fn initialize_pool(&self, pool: Address, sqrt_price_x96: U160) -> basket_provisioner::ProvisionResult<TxReceipt> {
        let tick = get_tick_at_sqrt_ratio(U256::from(sqrt_price_x96))?;
        let mut state = self.state.lock().unwrap();
        let entry = state.pools.entry(pool).or_default();
        entry.sqrt_price_x96 = sqrt_price_x96;
        entry.tick = tick;
        Ok(Self::receipt(&mut state, Tx::Initialize { pool }))
    }
}

#[async_trait]
impl PoolStateClient for MockChain {
    async fn liquidity(&self, pool: Address) -> basket_provisioner::ProvisionResult<u128> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.pool_reads += 1;
        state
            .pools
            .get(&pool)
            .map(|p| p.liquidity)
            .ok_or_else(|| ProtocolError::PoolNotFound(pool).into())
    }

    async fn slot0(&self, pool: Address) -> basket_provisioner::ProvisionResult<Slot0> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.pool_reads += 1;
        state
            .pools
            .get(&pool)
            .map(|p| Slot0 {
                sqrt_price_x96: p.sqrt_price_x96,
                tick: p.tick,
            })
            .ok_or_else(|| ProtocolError::PoolNotFound(pool).into())
    }
}

#[async_trait]
impl PositionManagerClient for MockChain {
    async fn submit(
        &self,
        _position_manager: Address,
        _calldata: Bytes,
        value: U256,
    ) -> basket_provisioner::ProvisionResult<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        if state.revert_mint {
            let receipt = Self::receipt(&mut state, Tx::Mint { value });
            return Err(ProtocolError::TransactionReverted { hash: receipt.hash }.into());
        }
        for pool in state.pools.values_mut() {
            pool.liquidity += 1;
        }
        Ok(Self::receipt(&mut state, Tx::Mint { value }))
    }
}

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(ETHER)
}

fn set_token() -> Address {
    Address::repeat_byte(0x11)
}

fn network() -> NetworkConfig {
    NetworkConfig::localhost()
}

fn pool_key() -> PoolKey {
    PoolKey::new(set_token(), network().wrapped_native, FeeTier::Medium).unwrap()
}

fn request(pool_setup: PoolSetup) -> ProvisionRequest {
    ProvisionRequest {
        set_token: set_token(),
        set_amount: ether(100),
        native_amount: ether(1),
        pool_setup,
        recipient: None,
        pay_with_native: false,
    }
}

fn provisioner(chain: &Arc<MockChain>, dry_run: bool) -> Provisioner<MockChain> {
    Provisioner::new(chain.clone(), network(), ProvisioningSettings::default(), dry_run)
}

/// Price as (amount0, amount1) for the default deposit
fn deposit_price() -> (U256, U256) {
    // 0x11.. sorts before WETH, so the set token is token0
    (ether(100), ether(1))
}

#[tokio::test]
async fn test_insufficient_set_balance_sends_nothing() {
    let chain = Arc::new(MockChain::new());
    chain.fund(ether(10), &[(set_token(), ether(50))]);

    let outcome = provisioner(&chain, false)
        .provision(&request(PoolSetup::Create))
        .await
        .unwrap();

    match outcome {
        ProvisionOutcome::InsufficientBalance(shortfall) => {
            assert_eq!(shortfall.asset, set_token());
            assert_eq!(shortfall.required, ether(100));
            assert_eq!(shortfall.available, ether(50));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_wrapped_balance_does_not_cover_native_shortfall() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(U256::from(ETHER / 2), &[(set_token(), ether(100)), (weth, U256::from(6 * ETHER / 10))]);
    chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));

    let outcome = provisioner(&chain, false)
        .provision(&request(PoolSetup::Existing))
        .await
        .unwrap();

    match outcome {
        ProvisionOutcome::InsufficientBalance(shortfall) => {
            assert_eq!(shortfall.asset, Address::ZERO);
            assert_eq!(shortfall.required, ether(1));
            assert_eq!(shortfall.available, U256::from(ETHER / 2));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_existing_pool_goes_straight_to_reading_state() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    let pool = chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));

    let outcome = provisioner(&chain, false)
        .provision(&request(PoolSetup::Existing))
        .await
        .unwrap();

    let report = match outcome {
        ProvisionOutcome::Confirmed(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(report.pool, pool);
    assert_eq!(
        report.steps,
        vec![
            ProvisioningStep::CheckingBalances,
            ProvisioningStep::Approving,
            ProvisioningStep::ReadingPoolState,
            ProvisioningStep::BuildingPosition,
            ProvisioningStep::Submitting,
            ProvisioningStep::Confirmed,
        ]
    );

    let txs = chain.transactions();
    assert_eq!(
        txs,
        vec![
            Tx::Approve { token: set_token(), amount: ether(100) },
            Tx::Approve { token: weth, amount: ether(1) },
            Tx::Mint { value: U256::ZERO },
        ]
    );
    assert_eq!(report.transactions.len(), 3);

    let spacing = FeeTier::Medium.tick_spacing();
    assert!(report.position.tick_lower < report.position.tick_upper);
    assert_eq!(report.position.tick_lower % spacing, 0);
    assert_eq!(report.position.tick_upper % spacing, 0);
    assert!(report.position.amount0 <= ether(100));
    assert!(report.position.amount1 <= ether(1));
    assert!(report.mint.amount0_min <= report.position.amount0);

    let after = report.pool_state_after.unwrap();
    assert_eq!(after.liquidity, report.pool_state_before.liquidity + 1);
}

#[tokio::test]
async fn test_create_flow_runs_every_step_in_order() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, U256::from(ETHER / 4))]);

    let outcome = provisioner(&chain, false)
        .provision(&request(PoolSetup::Create))
        .await
        .unwrap();

    let report = match outcome {
        ProvisionOutcome::Confirmed(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(
        report.steps,
        vec![
            ProvisioningStep::CheckingBalances,
            ProvisioningStep::Approving,
            ProvisioningStep::EnsuringWrappedBalance,
            ProvisioningStep::CreatingPool,
            ProvisioningStep::InitializingPool,
            ProvisioningStep::ReadingPoolState,
            ProvisioningStep::BuildingPosition,
            ProvisioningStep::Submitting,
            ProvisioningStep::Confirmed,
        ]
    );

    let pool = pool_address_for_key(network().factory, &pool_key());
    assert_eq!(
        chain.transactions(),
        vec![
            Tx::Approve { token: set_token(), amount: ether(100) },
            Tx::Approve { token: weth, amount: ether(1) },
            Tx::Wrap { amount: U256::from(3 * ETHER / 4) },
            Tx::CreatePool,
            Tx::Initialize { pool },
            Tx::Mint { value: U256::ZERO },
        ]
    );

    let expected_sqrt = encode_sqrt_price(ether(1), ether(100)).unwrap();
    assert_eq!(U256::from(report.pool_state_before.sqrt_price_x96), expected_sqrt);
}

#[tokio::test]
async fn test_create_surfaces_existing_pool() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    let pool = chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));

    let result = provisioner(&chain, false)
        .provision(&request(PoolSetup::Create))
        .await;

    match result {
        Err(ProvisionError::Protocol(ProtocolError::PoolAlreadyExists(existing))) => {
            assert_eq!(existing, pool)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // The factory lookup runs before any approval
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_detect_initializes_uninitialized_pool_only() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    let pool = chain.deploy_pool(network().factory, pool_key(), None);

    let outcome = provisioner(&chain, false)
        .provision(&request(PoolSetup::Detect))
        .await
        .unwrap();

    let report = match outcome {
        ProvisionOutcome::Confirmed(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(report.steps.contains(&ProvisioningStep::InitializingPool));
    assert!(!report.steps.contains(&ProvisioningStep::CreatingPool));

    let txs = chain.transactions();
    assert!(!txs.contains(&Tx::CreatePool));
    assert!(txs.contains(&Tx::Initialize { pool }));
}

#[tokio::test]
async fn test_detect_creates_missing_pool() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);

    provisioner(&chain, false)
        .provision(&request(PoolSetup::Detect))
        .await
        .unwrap();

    let txs = chain.transactions();
    assert!(txs.contains(&Tx::CreatePool));
    assert!(txs.iter().any(|tx| matches!(tx, Tx::Initialize { .. })));
}

#[tokio::test]
async fn test_detect_skips_setup_for_live_pool() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));

    provisioner(&chain, false)
        .provision(&request(PoolSetup::Detect))
        .await
        .unwrap();

    let txs = chain.transactions();
    assert!(!txs.contains(&Tx::CreatePool));
    assert!(!txs.iter().any(|tx| matches!(tx, Tx::Initialize { .. })));
}

#[tokio::test]
async fn test_existing_mode_without_pool_fails() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);

    let result = provisioner(&chain, false)
        .provision(&request(PoolSetup::Existing))
        .await;

    assert!(matches!(
        result,
        Err(ProvisionError::Protocol(ProtocolError::PoolNotFound(_)))
    ));
}

#[tokio::test]
async fn test_existing_mode_rejects_uninitialized_pool() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    chain.deploy_pool(network().factory, pool_key(), None);

    let result = provisioner(&chain, false)
        .provision(&request(PoolSetup::Existing))
        .await;

    assert!(matches!(
        result,
        Err(ProvisionError::Protocol(ProtocolError::PoolNotInitialized(_)))
    ));
}

#[tokio::test]
async fn test_dry_run_sends_no_transactions() {
    let chain = Arc::new(MockChain::new());
    chain.fund(ether(5), &[(set_token(), ether(100))]);

    let outcome = provisioner(&chain, true)
        .provision(&request(PoolSetup::Create))
        .await
        .unwrap();

    let report = match outcome {
        ProvisionOutcome::DryRun(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert!(chain.transactions().is_empty());
    assert!(report.transactions.is_empty());
    assert!(report.pool_state_after.is_none());
    assert!(report.steps.contains(&ProvisioningStep::CreatingPool));
    assert!(!report.steps.contains(&ProvisioningStep::Submitting));
    assert_eq!(report.pool_state_before.liquidity, 0);
    assert!(report.position.liquidity > 0);
}

#[tokio::test]
async fn test_native_payment_attaches_value_without_wrapping() {
    let chain = Arc::new(MockChain::new());
    chain.fund(ether(5), &[(set_token(), ether(100))]);
    chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));

    let mut req = request(PoolSetup::Existing);
    req.pay_with_native = true;
    let outcome = provisioner(&chain, false).provision(&req).await.unwrap();

    let report = match outcome {
        ProvisionOutcome::Confirmed(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };

    let txs = chain.transactions();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0], Tx::Approve { token: set_token(), amount: ether(100) });
    assert_eq!(txs[1], Tx::Mint { value: report.position.amount1 });
    assert!(report.mint.value > U256::ZERO);
    assert!(report.mint.value <= ether(1));
}

#[tokio::test]
async fn test_invalid_input_rejected_before_any_call() {
    let chain = Arc::new(MockChain::new());

    let mut req = request(PoolSetup::Create);
    req.set_token = network().wrapped_native;
    let result = provisioner(&chain, false).provision(&req).await;
    assert!(matches!(
        result,
        Err(ProvisionError::Validation(ValidationError::IdenticalTokens(_)))
    ));

    let mut req = request(PoolSetup::Create);
    req.native_amount = U256::ZERO;
    let result = provisioner(&chain, false).provision(&req).await;
    assert!(matches!(result, Err(ProvisionError::Validation(ValidationError::Math(_)))));

    let mut settings = ProvisioningSettings::default();
    settings.slippage_bps = 10_000;
    let result = Provisioner::new(chain.clone(), network(), settings, false)
        .provision(&request(PoolSetup::Create))
        .await;
    assert!(matches!(
        result,
        Err(ProvisionError::Validation(ValidationError::InvalidSlippage(10_000)))
    ));

    assert_eq!(chain.calls(), 0);
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_zero_tick_radius_rejected_before_any_call() {
    let chain = Arc::new(MockChain::new());
    chain.fund(ether(5), &[(set_token(), ether(100))]);

    let mut settings = ProvisioningSettings::default();
    settings.tick_radius = 0;
    let result = Provisioner::new(chain.clone(), network(), settings, false)
        .provision(&request(PoolSetup::Create))
        .await;

    assert!(matches!(
        result,
        Err(ProvisionError::Validation(ValidationError::RangeTooNarrow { .. }))
    ));
    assert_eq!(chain.calls(), 0);
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_reverted_mint_ends_run_without_retry() {
    let chain = Arc::new(MockChain::new());
    let weth = network().wrapped_native;
    chain.fund(ether(5), &[(set_token(), ether(100)), (weth, ether(1))]);
    chain.deploy_pool(network().factory, pool_key(), Some(deposit_price()));
    chain.revert_mints();

    let result = provisioner(&chain, false)
        .provision(&request(PoolSetup::Existing))
        .await;

    assert!(matches!(
        result,
        Err(ProvisionError::Protocol(ProtocolError::TransactionReverted { .. }))
    ));

    let mints = chain
        .transactions()
        .iter()
        .filter(|tx| matches!(tx, Tx::Mint { .. }))
        .count();
    assert_eq!(mints, 1);

    // Only the pre-mint snapshot (liquidity + slot0) was read
    assert_eq!(chain.pool_reads(), 2);
}
