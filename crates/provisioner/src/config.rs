use std::collections::BTreeMap;
use std::fs;

use alloy_primitives::{address, Address};
use basket_types::{FeeTier, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, ProvisionResult};

/// Provisioner configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProvisionerConfig {
    /// Position and transaction defaults
    pub provisioning: ProvisioningSettings,

    /// Contract address tables keyed by network name
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Defaults applied to every provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProvisioningSettings {
    /// Fee tier of the pool to provision
    pub fee_tier: FeeTier,

    /// Tick spacings on each side of the current tick
    pub tick_radius: u32,

    /// Tolerated shortfall of each minted amount (basis points)
    pub slippage_bps: u32,

    /// Seconds until a submitted mint expires
    pub deadline_seconds: u64,

    /// Delay between receipt polls (milliseconds)
    pub confirmation_poll_ms: u64,
}

/// Addresses of one deployment of the pool contracts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub factory: Address,
    pub position_manager: Address,

    /// Wrapped native token paired with the set token
    pub wrapped_native: Address,
}

const MAINNET_FACTORY: Address = address!("1F98431c8aD98523631AE4a59f267346ea31F984");
const MAINNET_POSITION_MANAGER: Address = address!("C36442b4a4522E871399CD717aBDD847Ab11FE88");
const MAINNET_WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

impl ProvisionerConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> ProvisionResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProvisionError::InvalidConfig(format!("Failed to read config file {}: {}", path, e))
        })?;

        let config: ProvisionerConfig = toml::from_str(&content).map_err(|e| {
            ProvisionError::InvalidConfig(format!("Failed to parse config file {}: {}", path, e))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> ProvisionResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProvisionError::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| {
            ProvisionError::InvalidConfig(format!("Failed to write config file {}: {}", path, e))
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ProvisionResult<()> {
        if self.networks.is_empty() {
            return Err(invalid("networks", "empty", "at least one network"));
        }

        self.provisioning.validate()?;

        for (name, network) in &self.networks {
            network.validate(name)?;
        }

        Ok(())
    }

    /// Look up a network by name
    pub fn network(&self, name: &str) -> ProvisionResult<&NetworkConfig> {
        self.networks.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.networks.keys().map(String::as_str).collect();
            ProvisionError::InvalidConfig(format!(
                "Unknown network '{}' (configured: {})",
                name,
                known.join(", ")
            ))
        })
    }
}

impl ProvisioningSettings {
    /// Validate settings, including command-line overrides
    pub fn validate(&self) -> ProvisionResult<()> {
        if self.tick_radius == 0 {
            return Err(invalid("tick_radius", "0", "greater than 0"));
        }

        if self.slippage_bps >= BPS_DENOMINATOR {
            return Err(invalid(
                "slippage_bps",
                &self.slippage_bps.to_string(),
                "below 10000 (100%)",
            ));
        }

        if self.deadline_seconds == 0 {
            return Err(invalid("deadline_seconds", "0", "greater than 0"));
        }

        if self.confirmation_poll_ms == 0 {
            return Err(invalid("confirmation_poll_ms", "0", "greater than 0"));
        }

        Ok(())
    }
}

impl NetworkConfig {
    fn validate(&self, name: &str) -> ProvisionResult<()> {
        if self.rpc_url.is_empty() {
            return Err(invalid(&format!("networks.{}.rpc_url", name), "empty", "non-empty URL"));
        }

        let contracts = [
            ("factory", self.factory),
            ("position_manager", self.position_manager),
            ("wrapped_native", self.wrapped_native),
        ];
        for (field, address) in contracts {
            if address.is_zero() {
                return Err(invalid(
                    &format!("networks.{}.{}", name, field),
                    "zero address",
                    "a deployed contract",
                ));
            }
        }

        Ok(())
    }

    /// Mainnet deployment
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            rpc_url: "https://eth.llamarpc.com".to_string(),
            factory: MAINNET_FACTORY,
            position_manager: MAINNET_POSITION_MANAGER,
            wrapped_native: MAINNET_WETH,
        }
    }

    /// Local fork of mainnet (hardhat / anvil)
    pub fn localhost() -> Self {
        Self {
            chain_id: 31337,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            ..Self::mainnet()
        }
    }
}

fn invalid(field: &str, value: &str, expected: &str) -> ProvisionError {
    ProvisionError::InvalidConfig(format!("{} = {}: expected {}", field, value, expected))
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert("mainnet".to_string(), NetworkConfig::mainnet());
        networks.insert("localhost".to_string(), NetworkConfig::localhost());

        Self {
            provisioning: ProvisioningSettings::default(),
            networks,
        }
    }
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            fee_tier: FeeTier::Medium,
            tick_radius: 2,
            slippage_bps: 50, // 0.5%
            deadline_seconds: 1200, // 20 minutes
            confirmation_poll_ms: 1000,
        }
    }
}

/// Create example configuration file
pub fn create_example_config(path: &str) -> ProvisionResult<()> {
    ProvisionerConfig::default().save(path)
}
