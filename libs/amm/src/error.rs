//! AMM math errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// Pool is dormant or the quoted output would drain a reserve
    #[error("Insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: &'static str },

    /// Deposit does not cover the pool's current ratio
    #[error("Ratio mismatch: {required} token units required, {supplied} supplied")]
    RatioMismatch { required: u128, supplied: u128 },

    #[error("Insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: &'static str },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },
}

pub type Result<T> = std::result::Result<T, AmmError>;
