//! Caller-visible exchange errors
//!
//! Every failure is synchronous and typed; nothing is retried or swallowed
//! inside the engine.

use crate::token::TransferError;
use amm::AmmError;
use thiserror::Error;
use types::{Address, AmountError, Timestamp};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Deadline {deadline} has passed (now {now})")]
    Expired { deadline: Timestamp, now: Timestamp },

    #[error("Insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: &'static str },

    #[error("Ratio mismatch: deposit needs {required} token units, {supplied} offered")]
    RatioMismatch { required: u128, supplied: u128 },

    #[error("Slippage exceeded on {leg}: got {actual}, minimum {minimum}")]
    SlippageExceeded {
        leg: &'static str,
        actual: u128,
        minimum: u128,
    },

    #[error("Insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    #[error("No pool for token {0}")]
    PoolNotFound(Address),

    #[error("Pool for token {0} already exists")]
    PoolAlreadyExists(Address),

    #[error("Transfer rejected: {0}")]
    TransferRejected(#[from] TransferError),

    /// Withdrawal committed, token leg held in the pool for a later claim
    #[error("Withdrawal committed but token payout failed; {owed} units owed: {cause}")]
    PayoutDeferred {
        owed: u128,
        #[source]
        cause: TransferError,
    },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: &'static str },

    #[error("Invalid amount text: {0}")]
    AmountText(#[from] AmountError),

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: &'static str },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },
}

impl From<AmmError> for ExchangeError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::InsufficientLiquidity { reason } => Self::InsufficientLiquidity { reason },
            AmmError::RatioMismatch { required, supplied } => {
                Self::RatioMismatch { required, supplied }
            }
            AmmError::InsufficientShares {
                requested,
                available,
            } => Self::InsufficientShares {
                requested,
                available,
            },
            AmmError::InvalidAmount { reason } => Self::InvalidAmount { reason },
            AmmError::Overflow { context } => Self::Overflow { context },
        }
    }
}

impl ExchangeError {
    /// Short stable label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::RatioMismatch { .. } => "ratio_mismatch",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::InsufficientShares { .. } => "insufficient_shares",
            Self::PoolNotFound(_) => "pool_not_found",
            Self::PoolAlreadyExists(_) => "pool_already_exists",
            Self::TransferRejected(_) => "transfer_rejected",
            Self::PayoutDeferred { .. } => "payout_deferred",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::AmountText(_) => "amount_text",
            Self::InvalidRoute { .. } => "invalid_route",
            Self::Overflow { .. } => "overflow",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
