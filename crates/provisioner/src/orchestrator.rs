use std::fmt;
use std::sync::Arc;

use alloy_primitives::{aliases::U160, Address, U256};
use basket_math::{encode_sqrt_price, get_tick_at_sqrt_ratio};
use basket_types::{Amount, MintParameters, PoolKey, PoolState, Position, TokenIdentity, BPS_DENOMINATOR};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{ChainClient, TxReceipt};
use crate::config::{NetworkConfig, ProvisioningSettings};
use crate::error::{ProtocolError, ProvisionError, ProvisionResult, ValidationError};
use crate::mint::{build_mint_parameters, MintOptions};
use crate::pool_address::pool_address_for_key;
use crate::position::{build_position, tick_range};

/// Stages of a provisioning run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProvisioningStep {
    CheckingBalances,
    Approving,
    EnsuringWrappedBalance,
    CreatingPool,
    InitializingPool,
    ReadingPoolState,
    BuildingPosition,
    Submitting,
    Confirmed,
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisioningStep::CheckingBalances => "checking balances",
            ProvisioningStep::Approving => "approving",
            ProvisioningStep::EnsuringWrappedBalance => "ensuring wrapped balance",
            ProvisioningStep::CreatingPool => "creating pool",
            ProvisioningStep::InitializingPool => "initializing pool",
            ProvisioningStep::ReadingPoolState => "reading pool state",
            ProvisioningStep::BuildingPosition => "building position",
            ProvisioningStep::Submitting => "submitting",
            ProvisioningStep::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// How the run treats the pool before reading its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PoolSetup {
    /// Create and initialize the pool; fails if it already exists
    Create,
    /// The pool exists and is initialized
    #[default]
    Existing,
    /// Decide from chain state: create and/or initialize only what is missing
    Detect,
}

/// One liquidity deposit of a set token against the wrapped native asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub set_token: Address,

    /// Set token deposit in base units
    pub set_amount: Amount,

    /// Native asset deposit in wei
    pub native_amount: Amount,

    pub pool_setup: PoolSetup,

    /// Position owner; defaults to the sender
    pub recipient: Option<Address>,

    /// Attach the native leg as call value instead of wrapping it first
    pub pay_with_native: bool,
}

/// A deposit leg the sender cannot cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceShortfall {
    /// Token of the leg; the zero address for the native asset
    pub asset: Address,
    pub required: Amount,
    pub available: Amount,
}

/// Transaction confirmed during a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTransaction {
    pub step: ProvisioningStep,
    pub receipt: TxReceipt,
}

/// Everything a run did and computed
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub set_token: TokenIdentity,
    pub pool: Address,
    pub pool_key: PoolKey,
    pub steps: Vec<ProvisioningStep>,
    pub transactions: Vec<StepTransaction>,

    /// Snapshot the position was sized against
    pub pool_state_before: PoolState,

    /// Snapshot read after the mint confirmed
    pub pool_state_after: Option<PoolState>,

    pub position: Position,
    pub mint: MintParameters,
}

#[derive(Debug, Clone, Serialize)]
pub enum ProvisionOutcome {
    /// Stopped before sending anything
    InsufficientBalance(BalanceShortfall),
    /// Everything computed, nothing sent
    DryRun(Box<ProvisionReport>),
    Confirmed(Box<ProvisionReport>),
}

/// Transient state of one run
#[derive(Default)]
struct RunLog {
    steps: Vec<ProvisioningStep>,
    transactions: Vec<StepTransaction>,
}

impl RunLog {
    fn enter(&mut self, step: ProvisioningStep) {
        info!("Step: {}", step);
        self.steps.push(step);
    }

    fn record(&mut self, step: ProvisioningStep, receipt: TxReceipt) {
        info!(
            "Confirmed {} tx {} in block {} (gas {})",
            step, receipt.hash, receipt.block_number, receipt.gas_used
        );
        self.transactions.push(StepTransaction { step, receipt });
    }
}

/// Drives one deposit through approvals, pool setup, sizing, and the mint
pub struct Provisioner<C> {
    client: Arc<C>,
    network: NetworkConfig,
    settings: ProvisioningSettings,
    dry_run: bool,
}

impl<C: ChainClient> Provisioner<C> {
    pub fn new(
        client: Arc<C>,
        network: NetworkConfig,
        settings: ProvisioningSettings,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            network,
            settings,
            dry_run,
        }
    }

    /// Run the full provisioning sequence.
    ///
    /// Every side-effecting step waits for confirmation before the next one
    /// starts. Nothing is retried.
    pub async fn provision(&self, request: &ProvisionRequest) -> ProvisionResult<ProvisionOutcome> {
        let wrapped_native = self.network.wrapped_native;
        let key = PoolKey::new(request.set_token, wrapped_native, self.settings.fee_tier)
            .ok_or(ValidationError::IdenticalTokens(request.set_token))?;
        let (amount0, amount1) = if key.token0 == request.set_token {
            (request.set_amount, request.native_amount)
        } else {
            (request.native_amount, request.set_amount)
        };

        // Reject bad input before touching the chain
        self.validate_settings(&key)?;
        let initial_sqrt_price = encode_sqrt_price(amount1, amount0)?;
        let pool = pool_address_for_key(self.network.factory, &key);
        debug!("Pool {} for {:?}, initial sqrt price {}", pool, key, initial_sqrt_price);

        let sender = self.client.sender();
        let recipient = request.recipient.unwrap_or(sender);
        let mut run = RunLog::default();

        run.enter(ProvisioningStep::CheckingBalances);
        let chain_id = self.client.chain_id().await?;
        if chain_id != self.network.chain_id {
            return Err(ProvisionError::InvalidConfig(format!(
                "Connected to chain {}, network expects {}",
                chain_id, self.network.chain_id
            )));
        }
        let set_token = self.client.token_identity(chain_id, request.set_token).await?;
        info!("Set token: {} ({} decimals)", set_token, set_token.decimals);

        let wrapped_balance = match self.check_balances(request, sender).await? {
            Ok(wrapped_balance) => wrapped_balance,
            Err(shortfall) => {
                warn!(
                    "Insufficient balance of {}: required {}, available {}",
                    shortfall.asset, shortfall.required, shortfall.available
                );
                return Ok(ProvisionOutcome::InsufficientBalance(shortfall));
            }
        };

        let (create, initialize) = self.plan_pool_setup(request.pool_setup, &key, pool).await?;
        debug!("Pool setup {:?}: create {}, initialize {}", request.pool_setup, create, initialize);

        run.enter(ProvisioningStep::Approving);
        let mut approvals = vec![(request.set_token, request.set_amount)];
        if !request.pay_with_native {
            approvals.push((wrapped_native, request.native_amount));
        }
        for (token, amount) in approvals {
            if self.dry_run {
                info!("DRY RUN: Would approve {} of {} to {}", amount, token, self.network.position_manager);
                continue;
            }
            let receipt = self
                .client
                .approve(token, self.network.position_manager, amount)
                .await?;
            run.record(ProvisioningStep::Approving, receipt);
        }

        if !request.pay_with_native && wrapped_balance < request.native_amount {
            run.enter(ProvisioningStep::EnsuringWrappedBalance);
            let shortfall = request.native_amount - wrapped_balance;
            if self.dry_run {
                info!("DRY RUN: Would wrap {} wei", shortfall);
            } else {
                let receipt = self.client.wrap_native(wrapped_native, shortfall).await?;
                run.record(ProvisioningStep::EnsuringWrappedBalance, receipt);
            }
        } else {
            debug!("Skipping wrap: wrapped balance {} covers the native leg", wrapped_balance);
        }

        let simulated = self
            .setup_pool(create, initialize, &key, pool, initial_sqrt_price, &mut run)
            .await?;

        run.enter(ProvisioningStep::ReadingPoolState);
        let pool_state_before = match simulated {
            Some(state) => state,
            None => {
                let state = self.client.pool_state(pool).await?;
                if !state.is_initialized() {
                    return Err(ProtocolError::PoolNotInitialized(pool).into());
                }
                state
            }
        };
        info!(
            "Pool state: tick {}, sqrt price {}, liquidity {}",
            pool_state_before.tick, pool_state_before.sqrt_price_x96, pool_state_before.liquidity
        );

        run.enter(ProvisioningStep::BuildingPosition);
        let position = build_position(key, &pool_state_before, amount0, amount1, self.settings.tick_radius)?;
        let options = MintOptions {
            recipient,
            slippage_bps: self.settings.slippage_bps,
            deadline_seconds: self.settings.deadline_seconds,
            use_native: request.pay_with_native.then_some(wrapped_native),
        };
        let mint = build_mint_parameters(&position, &options, unix_now())?;
        info!(
            "Position [{}, {}] liquidity {}: amount0 {} (min {}), amount1 {} (min {})",
            position.tick_lower,
            position.tick_upper,
            position.liquidity,
            position.amount0,
            mint.amount0_min,
            position.amount1,
            mint.amount1_min
        );

        let mut report = ProvisionReport {
            set_token,
            pool,
            pool_key: key,
            steps: Vec::new(),
            transactions: Vec::new(),
            pool_state_before,
            pool_state_after: None,
            position,
            mint,
        };

        if self.dry_run {
            info!("DRY RUN: Would submit mint with value {}", report.mint.value);
            report.steps = run.steps;
            return Ok(ProvisionOutcome::DryRun(Box::new(report)));
        }

        run.enter(ProvisioningStep::Submitting);
        let receipt = self
            .client
            .submit(
                self.network.position_manager,
                report.mint.calldata.clone(),
                report.mint.value,
            )
            .await?;
        run.record(ProvisioningStep::Submitting, receipt);

        run.enter(ProvisioningStep::Confirmed);
        let after = self.client.pool_state(pool).await?;
        info!("Pool liquidity after mint: {}", after.liquidity);

        report.pool_state_after = Some(after);
        report.steps = run.steps;
        report.transactions = run.transactions;
        Ok(ProvisionOutcome::Confirmed(Box::new(report)))
    }

    fn validate_settings(&self, key: &PoolKey) -> ProvisionResult<()> {
        // Same range rule build_position applies, checked around tick 0
        tick_range(0, key.tick_spacing(), self.settings.tick_radius)?;
        if self.settings.slippage_bps >= BPS_DENOMINATOR {
            return Err(ValidationError::InvalidSlippage(self.settings.slippage_bps).into());
        }
        if self.settings.deadline_seconds == 0 {
            let now = unix_now();
            return Err(ValidationError::DeadlineInPast { deadline: now, now }.into());
        }
        Ok(())
    }

    /// Compare balances against the deposit and return the wrapped balance.
    /// The native balance alone must cover the native leg; the wrapped
    /// balance only shrinks what has to be wrapped.
    async fn check_balances(
        &self,
        request: &ProvisionRequest,
        owner: Address,
    ) -> ProvisionResult<Result<Amount, BalanceShortfall>> {
        let wrapped_native = self.network.wrapped_native;
        let (native, wrapped, set_balance) = tokio::try_join!(
            self.client.native_balance(owner),
            self.client.balance_of(wrapped_native, owner),
            self.client.balance_of(request.set_token, owner),
        )?;
        debug!("Balances: native {}, wrapped {}, set token {}", native, wrapped, set_balance);

        if set_balance < request.set_amount {
            return Ok(Err(BalanceShortfall {
                asset: request.set_token,
                required: request.set_amount,
                available: set_balance,
            }));
        }

        if native < request.native_amount {
            return Ok(Err(BalanceShortfall {
                asset: Address::ZERO,
                required: request.native_amount,
                available: native,
            }));
        }

        Ok(Ok(wrapped))
    }

    /// Decide from reads alone whether the pool must be created and/or
    /// initialized. Returns `(create, initialize)`.
    async fn plan_pool_setup(
        &self,
        setup: PoolSetup,
        key: &PoolKey,
        pool: Address,
    ) -> ProvisionResult<(bool, bool)> {
        let factory = self.network.factory;
        let plan = match setup {
            PoolSetup::Existing => (false, false),
            PoolSetup::Create => {
                if let Some(existing) = self.client.get_pool(factory, key).await? {
                    return Err(ProtocolError::PoolAlreadyExists(existing).into());
                }
                (true, true)
            }
            PoolSetup::Detect => match self.client.get_pool(factory, key).await? {
                None => (true, true),
                Some(actual) if actual != pool => {
                    return Err(ProtocolError::PoolAddressMismatch { expected: pool, actual }.into());
                }
                Some(_) => {
                    let slot0 = self.client.slot0(pool).await?;
                    (false, slot0.sqrt_price_x96.is_zero())
                }
            },
        };
        Ok(plan)
    }

    /// Create and initialize the pool as planned. In dry-run mode a pool
    /// that would be created or initialized is returned as a simulated snapshot
    /// at the initial price.
    async fn setup_pool(
        &self,
        create: bool,
        initialize: bool,
        key: &PoolKey,
        pool: Address,
        initial_sqrt_price: U256,
        run: &mut RunLog,
    ) -> ProvisionResult<Option<PoolState>> {
        let factory = self.network.factory;

        if create {
            run.enter(ProvisioningStep::CreatingPool);
            if self.dry_run {
                info!("DRY RUN: Would create pool {}", pool);
            } else {
                let receipt = self.client.create_pool(factory, key).await?;
                run.record(ProvisioningStep::CreatingPool, receipt);

                let actual = self.client.get_pool(factory, key).await?.unwrap_or(Address::ZERO);
                if actual != pool {
                    return Err(ProtocolError::PoolAddressMismatch { expected: pool, actual }.into());
                }
            }
        }

        if !initialize {
            return Ok(None);
        }

        run.enter(ProvisioningStep::InitializingPool);
        let sqrt_price_x96 = U160::saturating_from(initial_sqrt_price);
        if self.dry_run {
            info!("DRY RUN: Would initialize pool {} at sqrt price {}", pool, sqrt_price_x96);
            return Ok(Some(PoolState {
                liquidity: 0,
                sqrt_price_x96,
                tick: get_tick_at_sqrt_ratio(initial_sqrt_price)?,
            }));
        }

        let receipt = self.client.initialize_pool(pool, sqrt_price_x96).await?;
        run.record(ProvisioningStep::InitializingPool, receipt);
        Ok(None)
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
