//! Configuration Module
//!
//! This module defines all configuration structures for the deployer.
//! Configuration is loaded from TOML files and parsed using serde; every
//! field has a default so a partial (or missing) file is valid.
//!
//! The signing key is deliberately not part of the file. It is resolved from
//! the `DEPLOYER_PRIVATE_KEY` environment variable (a `.env` file is honoured).

use crate::types::DeployerError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the hex-encoded signing key
pub const PRIVATE_KEY_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// Configuration file used when none is named on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [network]
/// rpc_url = "https://eth.drpc.org"
/// chain_id = 1
///
/// [gas]
/// limit_multiplier_percent = 300
/// estimate_attempts = 3
///
/// [timeouts]
/// receipt_ms = 60000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    pub gas: GasConfig,
    pub timeouts: TimeoutConfig,
}

/// RPC endpoint and chain settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Block explorer base URL used for address and transaction links
    pub explorer_url: String,
    /// How often pending transactions are polled for a receipt
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://eth.drpc.org".to_string(),
            chain_id: 1,
            explorer_url: "https://etherscan.io".to_string(),
            poll_interval_ms: 2_000,
        }
    }
}

/// Location of the compiled contract (ABI + creation bytecode)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub artifact_path: PathBuf,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("contracts/Controller.json"),
        }
    }
}

/// Gas estimation policy
///
/// # Fields
/// - `limit_multiplier_percent`: safety margin applied to every estimate (300 = 3x)
/// - `estimate_attempts`: attempt cap for gas estimation
/// - `retry_delay_ms`: fixed pause between failed estimation attempts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub limit_multiplier_percent: u64,
    pub estimate_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            limit_multiplier_percent: 300,
            estimate_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// Upper bounds on how long each RPC call is waited on
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub balance_ms: u64,
    pub fee_data_ms: u64,
    pub estimate_ms: u64,
    pub nonce_ms: u64,
    pub receipt_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            balance_ms: 2_000,
            fee_data_ms: 2_000,
            estimate_ms: 3_000,
            nonce_ms: 2_000,
            receipt_ms: 60_000,
        }
    }
}

impl TimeoutConfig {
    pub fn balance(&self) -> Duration {
        Duration::from_millis(self.balance_ms)
    }

    pub fn fee_data(&self) -> Duration {
        Duration::from_millis(self.fee_data_ms)
    }

    pub fn estimate(&self) -> Duration {
        Duration::from_millis(self.estimate_ms)
    }

    pub fn nonce(&self) -> Duration {
        Duration::from_millis(self.nonce_ms)
    }

    pub fn receipt(&self) -> Duration {
        Duration::from_millis(self.receipt_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully read and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DeployerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DeployerError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load the operator's configuration.
    ///
    /// An explicitly named file must exist. Only the built-in
    /// `DEFAULT_CONFIG_PATH` may be absent, in which case the defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, DeployerError> {
        match explicit {
            Some(path) if !path.exists() => Err(DeployerError::Config(format!(
                "config file {} does not exist",
                path.display()
            ))),
            Some(path) => Self::load(path),
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn parse(content: &str) -> Result<Self, DeployerError> {
        let config: Config =
            toml::from_str(content).map_err(|e| DeployerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RPC_URL` and `CHAIN_ID` overrides from `lookup` (normally the
    /// process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), DeployerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Some(id) = lookup("CHAIN_ID") {
            self.network.chain_id = id
                .trim()
                .parse()
                .map_err(|_| DeployerError::Config(format!("CHAIN_ID is not a number: {id}")))?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), DeployerError> {
        if self.gas.estimate_attempts == 0 {
            return Err(DeployerError::Config(
                "gas.estimate_attempts must be at least 1".to_string(),
            ));
        }
        if self.gas.limit_multiplier_percent < 100 {
            return Err(DeployerError::Config(
                "gas.limit_multiplier_percent must be at least 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the signing key from `lookup` (normally the process environment)
pub fn resolve_private_key<F>(lookup: F) -> Result<String, DeployerError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(PRIVATE_KEY_VAR) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(DeployerError::Wallet(format!(
            "{PRIVATE_KEY_VAR} is not set; export it or add it to .env"
        ))),
    }
}
