//! Node configuration
//!
//! Loaded from a JSON file, then overridden by CLI flags and the `TOKEN_*`
//! environment variables used by deployment scripts.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_BLOCK_INTERVAL_MS, DEFAULT_RPC_PORT};
use crate::crypto::Address;
use crate::ledger::{Amount, InitParams};
use crate::proxy::LogicVersion;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How the block height advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockProduction {
    /// Every accepted call is sealed in its own block
    #[default]
    Automine,
    /// A timer seals a block every `millis`
    Interval { millis: u64 },
    /// Only `mineblock` advances the height
    Manual,
}

impl BlockProduction {
    pub fn interval() -> Self {
        BlockProduction::Interval {
            millis: DEFAULT_BLOCK_INTERVAL_MS,
        }
    }
}

/// Token parameters passed to `initialize` at deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    pub total_supply: Amount,
    #[serde(default)]
    pub mintable: bool,
    pub owner: Address,
    #[serde(default)]
    pub start_block: u64,
}

fn default_decimals() -> u8 {
    18
}

impl TokenConfig {
    pub fn init_params(&self) -> InitParams {
        InitParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            total_amount: self.total_supply,
            mintable: self.mintable,
            owner: self.owner,
            start_block: self.start_block,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// sled directory; state lives only in memory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default)]
    pub block_production: BlockProduction,
    /// Expose `mineblock` over RPC
    #[serde(default)]
    pub dev_rpc: bool,
    /// Label of the logic version deployed behind the proxy
    #[serde(default = "default_logic")]
    pub logic: String,
    /// Proxy admin
    pub admin: Address,
    pub token: TokenConfig,
}

fn default_rpc_port() -> u16 {
    DEFAULT_RPC_PORT
}

fn default_logic() -> String {
    LogicVersion::TokenV1.label().to_string()
}

impl NodeConfig {
    /// Minimal config with the admin also owning the token
    pub fn new(owner: Address, token_name: &str, token_symbol: &str, total_supply: Amount) -> Self {
        Self {
            data_dir: None,
            rpc_port: DEFAULT_RPC_PORT,
            block_production: BlockProduction::default(),
            dev_rpc: false,
            logic: default_logic(),
            admin: owner,
            token: TokenConfig {
                name: token_name.to_string(),
                symbol: token_symbol.to_string(),
                decimals: default_decimals(),
                total_supply,
                mintable: false,
                owner,
                start_block: 0,
            },
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn logic_version(&self) -> Result<LogicVersion, ConfigError> {
        LogicVersion::from_label(&self.logic)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown logic version '{}'", self.logic)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.name.trim().is_empty() {
            return Err(ConfigError::Invalid("token name is empty".into()));
        }
        if self.token.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("token symbol is empty".into()));
        }
        if self.token.owner.is_zero() {
            return Err(ConfigError::Invalid("token owner is the zero address".into()));
        }
        if self.admin.is_zero() {
            return Err(ConfigError::Invalid("proxy admin is the zero address".into()));
        }
        if let BlockProduction::Interval { millis: 0 } = self.block_production {
            return Err(ConfigError::Invalid("block interval must be positive".into()));
        }
        self.logic_version()?;
        Ok(())
    }
}

/// Token overrides taken from flags or the deployment environment
#[derive(Debug, Clone, Default, Args)]
pub struct TokenOverrides {
    #[arg(long, env = "TOKEN_NAME")]
    pub token_name: Option<String>,
    #[arg(long, env = "TOKEN_SYMBOL")]
    pub token_symbol: Option<String>,
    #[arg(long, env = "TOKEN_DECIMALS")]
    pub token_decimals: Option<u8>,
    #[arg(long, env = "TOKEN_TOTAL_SUPPLY")]
    pub token_total_supply: Option<Amount>,
    #[arg(long, env = "TOKEN_MINTABLE")]
    pub token_mintable: Option<bool>,
    #[arg(long, env = "TOKEN_OWNER")]
    pub token_owner: Option<Address>,
    #[arg(long, env = "TOKEN_START_BLOCK")]
    pub token_start_block: Option<u64>,
}

impl TokenOverrides {
    pub fn apply(&self, token: &mut TokenConfig) {
        if let Some(name) = &self.token_name {
            token.name = name.clone();
        }
        if let Some(symbol) = &self.token_symbol {
            token.symbol = symbol.clone();
        }
        if let Some(decimals) = self.token_decimals {
            token.decimals = decimals;
        }
        if let Some(total) = self.token_total_supply {
            token.total_supply = total;
        }
        if let Some(mintable) = self.token_mintable {
            token.mintable = mintable;
        }
        if let Some(owner) = self.token_owner {
            token.owner = owner;
        }
        if let Some(block) = self.token_start_block {
            token.start_block = block;
        }
    }
}
