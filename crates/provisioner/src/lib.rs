pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod mint;
pub mod orchestrator;
pub mod pool_address;
pub mod position;
pub mod units;

pub use client::{ChainClient, JsonRpcClient, TxReceipt};
pub use config::{NetworkConfig, ProvisionerConfig, ProvisioningSettings};
pub use error::{NetworkError, ProtocolError, ProvisionError, ProvisionResult, ValidationError};
pub use mint::{build_mint_parameters, MintOptions};
pub use orchestrator::{
    BalanceShortfall, PoolSetup, ProvisionOutcome, ProvisionReport, ProvisionRequest, Provisioner,
    ProvisioningStep,
};
pub use pool_address::{compute_pool_address, pool_address_for_key};
pub use position::build_position;
pub use units::parse_amount;
