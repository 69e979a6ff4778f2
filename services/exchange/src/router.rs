//! Token-to-token router
//!
//! A token-for-token trade is two independent pool operations: sell the
//! input token for base on pool A, then sell that base for the output token
//! on pool B. Each leg commits under its own pool lock. There is no rollback
//! across pools: when the second leg fails, the first leg stays committed,
//! the trader holds the intermediate base asset, and the outcome says so.
//!
//! The trader must have approved pool B's address on the base asset, since
//! leg two pulls the base proceeds from the trader like any other swap.

use crate::engine::ensure_not_expired;
use crate::error::{ExchangeError, Result};
use crate::operations::{Swap, SwapReceipt, TokenToTokenSwap};
use crate::registry::PoolRegistry;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use types::{Address, Timestamp};

/// Outcome of a composite swap whose first leg committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenToTokenOutcome {
    /// Both legs committed
    Completed {
        first_leg: SwapReceipt,
        second_leg: SwapReceipt,
    },
    /// First leg committed, second leg rejected; the trader holds
    /// `first_leg.amount_out` of the base asset
    SecondLegFailed {
        first_leg: SwapReceipt,
        #[serde(serialize_with = "serialize_error")]
        error: ExchangeError,
    },
}

impl TokenToTokenOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn first_leg(&self) -> &SwapReceipt {
        match self {
            Self::Completed { first_leg, .. } | Self::SecondLegFailed { first_leg, .. } => {
                first_leg
            }
        }
    }

    /// Output tokens received, if the trade completed
    pub fn tokens_bought(&self) -> Option<u128> {
        match self {
            Self::Completed { second_leg, .. } => Some(second_leg.amount_out),
            Self::SecondLegFailed { .. } => None,
        }
    }

    /// Base asset left with the trader by a failed second leg
    pub fn stranded_base(&self) -> Option<u128> {
        match self {
            Self::Completed { .. } => None,
            Self::SecondLegFailed { first_leg, .. } => Some(first_leg.amount_out),
        }
    }
}

fn serialize_error<S: serde::Serializer>(
    error: &ExchangeError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}

pub struct Router {
    registry: Arc<PoolRegistry>,
}

impl Router {
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Swap `token_in` of `token_sold` for `token_bought` via the base asset
    ///
    /// `Err` means nothing was committed. `Ok` always means the first leg
    /// committed; inspect the outcome for the second.
    pub fn swap_token_for_token(
        &self,
        request: &TokenToTokenSwap,
        now: Timestamp,
    ) -> Result<TokenToTokenOutcome> {
        ensure_not_expired(request.deadline, now)?;
        if request.token_sold == request.token_bought {
            return Err(ExchangeError::InvalidRoute {
                reason: "input and output token are the same",
            });
        }
        let pool_a = self.registry.lookup(&request.token_sold)?;
        let pool_b = self.registry.lookup(&request.token_bought)?;

        let first_leg = pool_a.token_to_base_swap(
            &Swap {
                trader: request.trader,
                amount_in: request.token_in,
                min_out: request.base_out_min_intermediate.max(1),
                deadline: request.deadline,
            },
            now,
        )?;

        let second = pool_b.base_to_token_swap(
            &Swap {
                trader: request.trader,
                amount_in: first_leg.amount_out,
                min_out: request.final_token_out_min,
                deadline: request.deadline,
            },
            now,
        );

        match second {
            Ok(second_leg) => {
                info!(
                    "Routed {} {} -> {} base -> {} {} for {}",
                    request.token_in,
                    pool_a.symbol(),
                    first_leg.amount_out,
                    second_leg.amount_out,
                    pool_b.symbol(),
                    request.trader.short()
                );
                Ok(TokenToTokenOutcome::Completed {
                    first_leg,
                    second_leg,
                })
            }
            Err(error) => {
                warn!(
                    "Second leg into {} failed after first leg committed; {} holds {} base: {}",
                    pool_b.symbol(),
                    request.trader,
                    first_leg.amount_out,
                    error
                );
                Ok(TokenToTokenOutcome::SecondLegFailed { first_leg, error })
            }
        }
    }

    /// Expected output of a token-to-token swap at current reserves
    pub fn quote_token_for_token(
        &self,
        token_sold: &Address,
        token_bought: &Address,
        token_in: u128,
    ) -> Result<u128> {
        if token_sold == token_bought {
            return Err(ExchangeError::InvalidRoute {
                reason: "input and output token are the same",
            });
        }
        let pool_a = self.registry.lookup(token_sold)?;
        let pool_b = self.registry.lookup(token_bought)?;

        let base = pool_a.quote_token_for_base(token_in)?;
        pool_b.quote_base_for_token(base)
    }
}
