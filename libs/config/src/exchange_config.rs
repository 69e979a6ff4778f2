//! Exchange Configuration Module
//!
//! Loads deployment settings from a TOML file with `LASWAP_`-prefixed
//! environment overrides layered on top.

use crate::defaults::{
    DEFAULT_BASE_SYMBOL, DEFAULT_CONFIG_PATH, DEFAULT_DECIMALS, DEFAULT_LOG_LEVEL, ENV_PREFIX,
    ENV_SEPARATOR,
};
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use types::{Address, MAX_DECIMALS};

/// Main exchange configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Amount scale and base asset naming
    pub exchange: ExchangeSettings,

    /// Tracing subscriber settings
    pub logging: LoggingConfig,

    /// Token pools created at bootstrap
    pub pools: Vec<PoolSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// Decimal scale of every amount crossing the caller surface
    pub decimals: u8,
    pub base_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"exchange=debug,warn"`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// One token/base pool to create when the registry boots
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolSpec {
    pub token: Address,
    pub symbol: String,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            base_symbol: DEFAULT_BASE_SYMBOL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

/// Semantic problems found after deserialization
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("decimals {decimals} exceeds the supported maximum of {max}")]
    UnsupportedDecimals { decimals: u8, max: u8 },

    #[error("pool for token {0} is configured more than once")]
    DuplicatePool(Address),

    #[error("pool for token {0} has an empty symbol")]
    EmptySymbol(Address),

    #[error("zero address cannot be used as a pool token")]
    ZeroTokenAddress,
}

impl ExchangeConfig {
    /// Load configuration from a file with `LASWAP_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration using a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        info!("Loading exchange config: {:?}", path);

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().context("Invalid exchange configuration")?;
        debug!(
            "Exchange config loaded: decimals={} pools={}",
            config.exchange.decimals,
            config.pools.len()
        );
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document (no env overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().context("Invalid exchange configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.exchange.decimals > MAX_DECIMALS {
            return Err(ConfigValidationError::UnsupportedDecimals {
                decimals: self.exchange.decimals,
                max: MAX_DECIMALS,
            });
        }

        let mut seen = HashSet::new();
        for pool in &self.pools {
            if pool.token.is_zero() {
                return Err(ConfigValidationError::ZeroTokenAddress);
            }
            if pool.symbol.trim().is_empty() {
                return Err(ConfigValidationError::EmptySymbol(pool.token));
            }
            if !seen.insert(pool.token) {
                return Err(ConfigValidationError::DuplicatePool(pool.token));
            }
        }
        Ok(())
    }

    /// Configured pool for `token`, if any
    pub fn pool(&self, token: &Address) -> Option<&PoolSpec> {
        self.pools.iter().find(|pool| &pool.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[exchange]
decimals = 6
base_symbol = "WETH"

[logging]
level = "debug"
json = true

[[pools]]
token = "0x3a034FE373B6304f98b7A24A3F21C958946d4075"
symbol = "USDC"

[[pools]]
token = "0xD77b79BE3e85351fF0cbe78f1B58cf8d1064047C"
symbol = "DAI"
"#;

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("exchange.toml");
        fs::write(&config_path, SAMPLE).unwrap();

        let config =
            ExchangeConfig::load_with_prefix(Some(&config_path), "LASWAP_TEST_UNSET").unwrap();

        assert_eq!(config.exchange.decimals, 6);
        assert_eq!(config.exchange.base_symbol, "WETH");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.pools.len(), 2);

        let usdc: Address = "0x3a034FE373B6304f98b7A24A3F21C958946d4075".parse().unwrap();
        assert_eq!(config.pool(&usdc).unwrap().symbol, "USDC");
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = ExchangeConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExchangeConfig::default());
        assert_eq!(config.exchange.decimals, DEFAULT_DECIMALS);
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert!(config.pools.is_empty());
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("exchange.toml");
        fs::write(&config_path, SAMPLE).unwrap();

        // Prefix unique to this test so parallel tests never observe it
        std::env::set_var("LASWAP_ENVTEST_EXCHANGE__DECIMALS", "8");
        let config =
            ExchangeConfig::load_with_prefix(Some(&config_path), "LASWAP_ENVTEST").unwrap();
        std::env::remove_var("LASWAP_ENVTEST_EXCHANGE__DECIMALS");

        assert_eq!(config.exchange.decimals, 8);
        assert_eq!(config.exchange.base_symbol, "WETH");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ExchangeConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_validation() {
        let too_fine = "[exchange]\ndecimals = 30\n";
        assert!(ExchangeConfig::from_toml_str(too_fine).is_err());

        let token = Address::repeat_byte(9);
        let mut config = ExchangeConfig::default();
        config.pools = vec![
            PoolSpec {
                token,
                symbol: "LINK".into(),
            },
            PoolSpec {
                token,
                symbol: "LINK2".into(),
            },
        ];
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicatePool(token))
        );

        config.pools.truncate(1);
        config.pools[0].symbol = " ".into();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptySymbol(token))
        );
    }
}
