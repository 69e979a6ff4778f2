//! Default configuration values
//!
//! Values used when a key is absent from both the TOML file and the
//! environment.

/// Default configuration file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/exchange.toml";

/// Prefix for environment overrides (`LASWAP_EXCHANGE__DECIMALS=6`)
pub const ENV_PREFIX: &str = "LASWAP";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Amount scale shared by every asset in a deployment (ETH-style 18 decimals)
pub const DEFAULT_DECIMALS: u8 = 18;

/// Display symbol of the base asset
pub const DEFAULT_BASE_SYMBOL: &str = "ETH";

/// Default tracing filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";
