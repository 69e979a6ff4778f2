//! # LASwap Exchange Configuration
//!
//! Centralized configuration for exchange deployments.
//!
//! ## Features
//!
//! - **Layered Loading**: TOML file first, `LASWAP_`-prefixed environment
//!   variables on top (`LASWAP_EXCHANGE__DECIMALS=6`)
//! - **Defaults**: every key is optional; see [`defaults`]
//! - **Validation**: decimal scale and pool list are checked after loading
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exchange_config::ExchangeConfig;
//!
//! let config = ExchangeConfig::load(None)?;
//! println!("{} pools at {} decimals", config.pools.len(), config.exchange.decimals);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod exchange_config;

// Re-export commonly used types
pub use exchange_config::{
    ConfigValidationError, ExchangeConfig, ExchangeSettings, LoggingConfig, PoolSpec,
};
