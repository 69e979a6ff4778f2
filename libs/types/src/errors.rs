//! Error types for address parsing and fixed-point amount conversion

use thiserror::Error;

/// Errors raised while parsing or formatting identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Input is not valid hexadecimal
    #[error("Invalid hex address: '{input}'")]
    InvalidHex { input: String },

    /// Decoded byte length is not 20
    #[error("Address must be 20 bytes, got {len}")]
    InvalidLength { len: usize },
}

/// Errors that can occur while converting human-readable amounts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Negative values have no unsigned representation
    #[error("Negative amount not allowed: '{input}'")]
    Negative { input: String },

    /// More fractional digits than the token scale carries
    #[error("Precision loss: '{input}' has more than {decimals} fractional digits")]
    PrecisionLoss { input: String, decimals: u8 },

    /// Scaled value does not fit the integer domain
    #[error("Overflow: '{input}' does not fit at {decimals} decimals")]
    Overflow { input: String, decimals: u8 },

    /// Scale is outside what `rust_decimal` can represent
    #[error("Unsupported decimal scale {decimals} (maximum 28)")]
    UnsupportedScale { decimals: u8 },
}
