use crate::onchain::client::DEFAULT_LOG_CHUNK_SIZE;
use crate::trades::{BlockBound, BlockRange, TradingPair, DAI, WETH};

use alloy::primitives::Address;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field} address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("invalid value for env var {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("no market contract address given (positional argument, OASIS_CONTRACT or [market].contract)")]
    MissingContract,
    #[error("invalid to-block {0}: use a block number or -1 for the chain head")]
    InvalidToBlock(i64),
}

/// What a run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Current state of the offer book.
    Orders,
    /// Historical trades.
    Trades,
}

/// Line format for trades mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TradeFormat {
    /// Every event, undirected: both legs, maker and taker.
    Raw,
    /// Directional tape on the configured pair: time, side, price, size.
    #[default]
    Tape,
}

// ─── File and env settings ───────────────────────────────────────────────────

/// Settings as read from `oasis-tape.toml`, before CLI flags are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC host
    #[serde(default = "default_rpc_host")]
    pub host: String,
    /// JSON-RPC port
    #[serde(default = "default_rpc_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSettings {
    /// Market contract address (can also come from the CLI or OASIS_CONTRACT)
    #[serde(default)]
    pub contract: Option<String>,
    /// Token whose `pay` leg makes a trade a sell
    #[serde(default = "default_token_a")]
    pub token_a: String,
    /// Token whose `pay` leg makes a trade a buy
    #[serde(default = "default_token_b")]
    pub token_b: String,
    /// Max blocks per eth_getLogs request
    #[serde(default = "default_log_chunk_size")]
    pub log_chunk_size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub trade_format: TradeFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_rpc_host() -> String {
    "localhost".to_string()
}
fn default_rpc_port() -> u16 {
    8545
}
fn default_token_a() -> String {
    DAI.to_string()
}
fn default_token_b() -> String {
    WETH.to_string()
}
fn default_log_chunk_size() -> u64 {
    DEFAULT_LOG_CHUNK_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: default_rpc_host(),
            port: default_rpc_port(),
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            contract: None,
            token_a: default_token_a(),
            token_b: default_token_b(),
            log_chunk_size: default_log_chunk_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ─── Resolved run config ─────────────────────────────────────────────────────

/// Values given on the command line. `None` leaves the file/env value alone.
#[derive(Debug, Clone)]
pub struct CliOverrides {
    pub contract: Option<String>,
    pub rpc_host: Option<String>,
    pub rpc_port: Option<u16>,
    pub from_block: u64,
    /// `-1` means the chain head at scan start.
    pub to_block: i64,
    pub mode: Mode,
    pub trade_format: Option<TradeFormat>,
}

/// Everything one run needs, fixed before any chain access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rpc: RpcConfig,
    pub contract: Address,
    pub range: BlockRange,
    pub mode: Mode,
    pub trade_format: TradeFormat,
    pub pair: TradingPair,
    pub log_chunk_size: u64,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.rpc.host, self.rpc.port)
    }
}

impl Settings {
    /// Load settings from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml_str(&contents)?;
        settings.overlay_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    /// Defaults plus environment variables (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        settings.overlay_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `OASIS_RPC_HOST`, `OASIS_RPC_PORT` and `OASIS_CONTRACT` from `lookup`.
    pub fn overlay_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OASIS_RPC_HOST") {
            self.rpc.host = host;
        }
        if let Some(port) = lookup("OASIS_RPC_PORT") {
            self.rpc.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "OASIS_RPC_PORT",
                value: port,
            })?;
        }
        if let Some(contract) = lookup("OASIS_CONTRACT") {
            self.market.contract = Some(contract);
        }
        Ok(())
    }

    /// Apply CLI flags and validate into a [`Config`].
    pub fn resolve(self, cli: CliOverrides) -> Result<Config, ConfigError> {
        let contract = cli
            .contract
            .or(self.market.contract)
            .ok_or(ConfigError::MissingContract)?;

        let to_block = match cli.to_block {
            -1 => BlockBound::Latest,
            n if n >= 0 => BlockBound::Number(n as u64),
            n => return Err(ConfigError::InvalidToBlock(n)),
        };

        Ok(Config {
            rpc: RpcConfig {
                host: cli.rpc_host.unwrap_or(self.rpc.host),
                port: cli.rpc_port.unwrap_or(self.rpc.port),
            },
            contract: parse_address("contract", &contract)?,
            range: BlockRange {
                from_block: cli.from_block,
                to_block,
            },
            mode: cli.mode,
            trade_format: cli.trade_format.unwrap_or(self.output.trade_format),
            pair: TradingPair {
                token_a: parse_address("token_a", &self.market.token_a)?,
                token_b: parse_address("token_b", &self.market.token_b)?,
            },
            log_chunk_size: self.market.log_chunk_size.max(1),
            logging: self.logging,
        })
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value.trim()).map_err(|_| ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}
