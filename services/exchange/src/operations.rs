//! Operation requests and receipts
//!
//! Requests are built from a caller's call, validated and applied once, then
//! dropped. Receipts report the effective amounts the engine committed.

use amm::SwapDirection;
use serde::{Deserialize, Serialize};
use types::{Address, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    pub provider: Address,
    pub base_in: u128,
    /// Upper bound on the token deposit; the full amount on an empty pool
    pub token_in_desired: u128,
    /// Lower bound on the token deposit; zero disables the check
    pub token_in_min: u128,
    pub deadline: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    pub provider: Address,
    pub shares: u128,
    pub base_out_min: u128,
    pub token_out_min: u128,
    pub deadline: Timestamp,
}

/// Exact-input swap against a single pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub trader: Address,
    pub amount_in: u128,
    /// Minimum acceptable output; zero disables the check
    pub min_out: u128,
    pub deadline: Timestamp,
}

/// Token-for-token swap routed through the base asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenToTokenSwap {
    pub trader: Address,
    /// Token sold into the first pool
    pub token_sold: Address,
    /// Token bought from the second pool
    pub token_bought: Address,
    pub token_in: u128,
    /// Floor on the base asset received from the first leg (raised to 1)
    pub base_out_min_intermediate: u128,
    pub final_token_out_min: u128,
    pub deadline: Timestamp,
}

/// A single-pool request awaiting execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingOperation {
    AddLiquidity(AddLiquidity),
    RemoveLiquidity(RemoveLiquidity),
    BaseToTokenSwap(Swap),
    TokenToBaseSwap(Swap),
}

impl PendingOperation {
    pub fn deadline(&self) -> Timestamp {
        match self {
            Self::AddLiquidity(op) => op.deadline,
            Self::RemoveLiquidity(op) => op.deadline,
            Self::BaseToTokenSwap(op) | Self::TokenToBaseSwap(op) => op.deadline,
        }
    }

    pub fn caller(&self) -> Address {
        match self {
            Self::AddLiquidity(op) => op.provider,
            Self::RemoveLiquidity(op) => op.provider,
            Self::BaseToTokenSwap(op) | Self::TokenToBaseSwap(op) => op.trader,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddLiquidity(_) => "add_liquidity",
            Self::RemoveLiquidity(_) => "remove_liquidity",
            Self::BaseToTokenSwap(_) => "base_to_token_swap",
            Self::TokenToBaseSwap(_) => "token_to_base_swap",
        }
    }
}

/// Result of a committed deposit or withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub base_amount: u128,
    pub token_amount: u128,
    /// Shares minted (deposit) or burned (withdrawal)
    pub shares: u128,
    pub total_shares: u128,
}

/// Result of a committed swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub token: Address,
    pub direction: SwapDirection,
    pub amount_in: u128,
    pub amount_out: u128,
    pub base_reserve: u128,
    pub token_reserve: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receipt {
    Liquidity(LiquidityReceipt),
    Swap(SwapReceipt),
}
