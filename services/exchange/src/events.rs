//! Pool event journal entries for external indexers

use serde::{Deserialize, Serialize};
use types::{Address, Timestamp};

/// Record of a committed pool operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum PoolEvent {
    LiquidityAdded {
        token: Address,
        provider: Address,
        base_amount: u128,
        token_amount: u128,
        shares_minted: u128,
        at: Timestamp,
    },
    LiquidityRemoved {
        token: Address,
        provider: Address,
        base_amount: u128,
        token_amount: u128,
        shares_burned: u128,
        at: Timestamp,
    },
    /// Base sold for tokens
    TokenPurchase {
        token: Address,
        buyer: Address,
        base_sold: u128,
        tokens_bought: u128,
        at: Timestamp,
    },
    /// Tokens sold for base
    BasePurchase {
        token: Address,
        buyer: Address,
        tokens_sold: u128,
        base_bought: u128,
        at: Timestamp,
    },
    SharesTransferred {
        token: Address,
        from: Address,
        to: Address,
        shares: u128,
    },
    /// Withdrawal token leg held in the pool after a failed payout
    PayoutDeferred {
        token: Address,
        provider: Address,
        token_amount: u128,
        at: Timestamp,
    },
    OwedClaimed {
        token: Address,
        provider: Address,
        token_amount: u128,
        at: Timestamp,
    },
}

impl PoolEvent {
    pub fn token(&self) -> Address {
        match self {
            Self::LiquidityAdded { token, .. }
            | Self::LiquidityRemoved { token, .. }
            | Self::TokenPurchase { token, .. }
            | Self::BasePurchase { token, .. }
            | Self::SharesTransferred { token, .. }
            | Self::PayoutDeferred { token, .. }
            | Self::OwedClaimed { token, .. } => *token,
        }
    }
}
