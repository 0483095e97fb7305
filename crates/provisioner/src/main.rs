// CLI for provisioning concentrated liquidity for basket tokens
//
// Pairs a set token with the network's wrapped native asset, optionally
// creates and initializes the pool, and mints a position around the
// current price.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use basket_provisioner::config::create_example_config;
use basket_provisioner::{
    compute_pool_address, parse_amount, JsonRpcClient, PoolSetup, ProvisionOutcome,
    ProvisionReport, ProvisionRequest, Provisioner, ProvisionerConfig,
};
use basket_types::FeeTier;

#[derive(Parser)]
#[command(name = "basket-lp")]
#[command(about = "Concentrated liquidity provisioning for basket tokens", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to provisioner configuration file
    #[arg(short, long, default_value = "basket-lp.toml", global = true)]
    config: String,

    /// Network entry to use from the configuration
    #[arg(short, long, default_value = "localhost", global = true)]
    network: String,

    /// Override the network's RPC URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Override log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit a set token and the native asset into a concentrated liquidity position
    Provision(ProvisionCmd),

    /// Print the pool address for a set token and fee tier
    PoolAddress(PoolAddressCmd),

    /// Write an example configuration file
    InitConfig,
}

#[derive(Args)]
struct ProvisionCmd {
    /// Set token address
    #[arg(long)]
    set_token: Address,

    /// Set token deposit ("1.5ether" or base units)
    #[arg(long)]
    set_amount: String,

    /// Native asset deposit ("0.01ether" or wei)
    #[arg(long)]
    native_amount: String,

    /// Sending account (defaults to the node's first account)
    #[arg(long)]
    from: Option<Address>,

    /// Position owner (defaults to the sender)
    #[arg(long)]
    recipient: Option<Address>,

    /// Create and initialize the pool first
    #[arg(long, conflicts_with = "detect_pool")]
    create_pool: bool,

    /// Detect from chain state whether the pool needs creating or initializing
    #[arg(long)]
    detect_pool: bool,

    /// Attach the native leg as call value instead of wrapping it
    #[arg(long)]
    pay_native: bool,

    /// Fee tier (lowest, low, medium, high)
    #[arg(long)]
    fee_tier: Option<FeeTier>,

    /// Tick spacings on each side of the current tick
    #[arg(long)]
    tick_radius: Option<u32>,

    /// Slippage tolerance in basis points
    #[arg(long)]
    slippage_bps: Option<u32>,

    /// Compute everything but send no transactions
    #[arg(long)]
    dry_run: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PoolAddressCmd {
    /// Set token address
    #[arg(long)]
    set_token: Address,

    /// Fee tier (lowest, low, medium, high)
    #[arg(long)]
    fee_tier: Option<FeeTier>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level.as_deref());

    if let Commands::InitConfig = cli.command {
        create_example_config(&cli.config)
            .with_context(|| format!("Failed to write {}", cli.config))?;
        success(&format!("Wrote example configuration to {}", cli.config));
        return Ok(());
    }

    let config = if Path::new(&cli.config).exists() {
        ProvisionerConfig::load(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config))?
    } else {
        warn!("Config file not found, using defaults: {}", cli.config);
        ProvisionerConfig::default()
    };

    let mut network = config.network(&cli.network)?.clone();
    if let Some(rpc_url) = cli.rpc_url {
        network.rpc_url = rpc_url;
    }

    match cli.command {
        Commands::Provision(cmd) => provision(cmd, config, network).await,
        Commands::PoolAddress(cmd) => {
            let fee_tier = cmd.fee_tier.unwrap_or(config.provisioning.fee_tier);
            let pool = compute_pool_address(network.factory, cmd.set_token, network.wrapped_native, fee_tier)?;
            println!("{}", pool);
            Ok(())
        }
        Commands::InitConfig => Ok(()),
    }
}

async fn provision(
    cmd: ProvisionCmd,
    config: ProvisionerConfig,
    network: basket_provisioner::NetworkConfig,
) -> Result<()> {
    let mut settings = config.provisioning;
    if let Some(fee_tier) = cmd.fee_tier {
        settings.fee_tier = fee_tier;
    }
    if let Some(tick_radius) = cmd.tick_radius {
        settings.tick_radius = tick_radius;
    }
    if let Some(slippage_bps) = cmd.slippage_bps {
        settings.slippage_bps = slippage_bps;
    }
    settings.validate().context("Invalid provisioning settings")?;

    let pool_setup = if cmd.create_pool {
        PoolSetup::Create
    } else if cmd.detect_pool {
        PoolSetup::Detect
    } else {
        PoolSetup::Existing
    };

    let request = ProvisionRequest {
        set_token: cmd.set_token,
        set_amount: parse_amount(&cmd.set_amount).context("Invalid --set-amount")?,
        native_amount: parse_amount(&cmd.native_amount).context("Invalid --native-amount")?,
        pool_setup,
        recipient: cmd.recipient,
        pay_with_native: cmd.pay_native,
    };

    info!("Network: chain {} via {}", network.chain_id, network.rpc_url);
    if cmd.dry_run {
        warn!("Running in DRY RUN mode - no transactions will be sent");
    }

    let poll = Duration::from_millis(settings.confirmation_poll_ms);
    let client = JsonRpcClient::connect(network.rpc_url.clone(), cmd.from, poll)
        .await
        .context("Failed to connect to RPC endpoint")?;

    let provisioner = Provisioner::new(Arc::new(client), network, settings, cmd.dry_run);
    let outcome = provisioner.provision(&request).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        ProvisionOutcome::InsufficientBalance(shortfall) => {
            let asset = if shortfall.asset.is_zero() {
                "native asset".to_string()
            } else {
                shortfall.asset.to_string()
            };
            warn_line(&format!(
                "Insufficient balance of {}: need {}, have {}",
                asset, shortfall.required, shortfall.available
            ));
        }
        ProvisionOutcome::DryRun(report) => {
            print_report(&report);
            warn_line("Dry run: nothing was submitted");
        }
        ProvisionOutcome::Confirmed(report) => {
            print_report(&report);
            success("Position minted");
        }
    }

    Ok(())
}

fn print_report(report: &ProvisionReport) {
    info_line(&format!("Set token: {}", report.set_token));
    info_line(&format!("Pool: {}", report.pool));
    for tx in &report.transactions {
        info_line(&format!("  {}: {} (block {})", tx.step, tx.receipt.hash, tx.receipt.block_number));
    }
    info_line(&format!(
        "Range: [{}, {}], liquidity {}",
        report.position.tick_lower, report.position.tick_upper, report.position.liquidity
    ));
    info_line(&format!(
        "Amounts: {} / {} (minimums {} / {})",
        report.position.amount0, report.position.amount1, report.mint.amount0_min, report.mint.amount1_min
    ));
    if let Some(after) = &report.pool_state_after {
        info_line(&format!("Pool liquidity now {}", after.liquidity));
    }
}

fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("basket_provisioner={},basket_lp={}", level, level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Print success message
fn success(msg: &str) {
    println!("[OK] {}", msg);
}

/// Print info message
fn info_line(msg: &str) {
    println!("[INFO] {}", msg);
}

/// Print warning message
fn warn_line(msg: &str) {
    eprintln!("[WARN] {}", msg);
}
