//! Per-pool reserve balances and invariant-preserving quotes

use crate::constant_product::ConstantProductMath;
use crate::error::{AmmError, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the pool a swap sells into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Sell base asset, buy token
    BaseToToken,
    /// Sell token, buy base asset
    TokenToBase,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::BaseToToken => write!(f, "base->token"),
            SwapDirection::TokenToBase => write!(f, "token->base"),
        }
    }
}

/// Base and token reserves held by one pool
///
/// Either both reserves are positive or both are zero (a dormant pool).
/// Mutators are checked and leave the state untouched on error, so the
/// engine can apply them to a copy and only publish the copy once every
/// other step of an operation has succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveState {
    base_reserve: u128,
    token_reserve: u128,
}

impl ReserveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from persisted balances
    pub fn from_reserves(base_reserve: u128, token_reserve: u128) -> Result<Self> {
        if (base_reserve == 0) != (token_reserve == 0) {
            return Err(AmmError::InvalidAmount {
                reason: "reserves must be both zero or both positive",
            });
        }
        Ok(Self {
            base_reserve,
            token_reserve,
        })
    }

    pub fn base_reserve(&self) -> u128 {
        self.base_reserve
    }

    pub fn token_reserve(&self) -> u128 {
        self.token_reserve
    }

    /// True for a pool nobody has provided liquidity to (or everyone left)
    pub fn is_empty(&self) -> bool {
        self.base_reserve == 0 && self.token_reserve == 0
    }

    /// Pricing invariant K, `None` when the product leaves the u128 domain
    pub fn invariant(&self) -> Option<u128> {
        self.base_reserve.checked_mul(self.token_reserve)
    }

    /// Token units per base unit, `None` for a dormant pool
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.is_empty() {
            return None;
        }
        let base = Decimal::from_u128(self.base_reserve)?;
        let token = Decimal::from_u128(self.token_reserve)?;
        token.checked_div(base)
    }

    pub fn quote_token_for_base(&self, token_in: u128) -> Result<u128> {
        self.quote(SwapDirection::TokenToBase, token_in)
    }

    pub fn quote_base_for_token(&self, base_in: u128) -> Result<u128> {
        self.quote(SwapDirection::BaseToToken, base_in)
    }

    /// Output for an exact input in the given direction
    pub fn quote(&self, direction: SwapDirection, amount_in: u128) -> Result<u128> {
        self.ensure_active()?;
        let (reserve_in, reserve_out) = self.oriented(direction);
        let amount_out =
            ConstantProductMath::calculate_output_amount(amount_in, reserve_in, reserve_out)?;

        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                reason: "output would drain the reserve",
            });
        }
        if amount_out == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "input too small to produce any output",
            });
        }
        Ok(amount_out)
    }

    /// Input needed to receive exactly `amount_out` in the given direction
    pub fn quote_exact_output(&self, direction: SwapDirection, amount_out: u128) -> Result<u128> {
        self.ensure_active()?;
        let (reserve_in, reserve_out) = self.oriented(direction);
        ConstantProductMath::calculate_input_amount(amount_out, reserve_in, reserve_out)
    }

    /// Minimal token deposit compatible with the current ratio for `base_in`
    pub fn required_token_deposit(&self, base_in: u128) -> Result<u128> {
        self.ensure_active()?;
        ConstantProductMath::proportional_deposit(base_in, self.base_reserve, self.token_reserve)
    }

    /// Pro-rata `(base_out, token_out)` for redeeming `shares` of `total_shares`
    pub fn quote_removal(&self, shares: u128, total_shares: u128) -> Result<(u128, u128)> {
        self.ensure_active()?;
        if total_shares == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "no shares outstanding",
            });
        }
        if shares > total_shares {
            return Err(AmmError::InsufficientShares {
                requested: shares,
                available: total_shares,
            });
        }

        let base_out = ConstantProductMath::mul_div_floor(
            self.base_reserve,
            shares,
            total_shares,
            "base withdrawal",
        )?;
        let token_out = ConstantProductMath::mul_div_floor(
            self.token_reserve,
            shares,
            total_shares,
            "token withdrawal",
        )?;
        Ok((base_out, token_out))
    }

    pub fn apply_add(&mut self, base_in: u128, token_in: u128) -> Result<()> {
        if base_in == 0 || token_in == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "deposit must include both assets",
            });
        }
        let base = self
            .base_reserve
            .checked_add(base_in)
            .ok_or(AmmError::Overflow {
                context: "base reserve",
            })?;
        let token = self
            .token_reserve
            .checked_add(token_in)
            .ok_or(AmmError::Overflow {
                context: "token reserve",
            })?;

        self.base_reserve = base;
        self.token_reserve = token;
        Ok(())
    }

    pub fn apply_remove(&mut self, base_out: u128, token_out: u128) -> Result<()> {
        let base = self.base_reserve.checked_sub(base_out);
        let token = self.token_reserve.checked_sub(token_out);
        match (base, token) {
            (Some(base), Some(token)) if (base == 0) == (token == 0) => {
                self.base_reserve = base;
                self.token_reserve = token;
                Ok(())
            }
            _ => Err(AmmError::InsufficientLiquidity {
                reason: "withdrawal exceeds reserves",
            }),
        }
    }

    /// Book a swap: `amount_in` joins the input reserve, `amount_out` leaves the other
    pub fn apply_swap_in_out(
        &mut self,
        direction: SwapDirection,
        amount_in: u128,
        amount_out: u128,
    ) -> Result<()> {
        self.ensure_active()?;
        let (reserve_in, reserve_out) = self.oriented(direction);
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                reason: "output would drain the reserve",
            });
        }
        let new_in = reserve_in.checked_add(amount_in).ok_or(AmmError::Overflow {
            context: "swap input reserve",
        })?;
        let new_out = reserve_out - amount_out;

        match direction {
            SwapDirection::BaseToToken => {
                self.base_reserve = new_in;
                self.token_reserve = new_out;
            }
            SwapDirection::TokenToBase => {
                self.token_reserve = new_in;
                self.base_reserve = new_out;
            }
        }
        Ok(())
    }

    fn oriented(&self, direction: SwapDirection) -> (u128, u128) {
        match direction {
            SwapDirection::BaseToToken => (self.base_reserve, self.token_reserve),
            SwapDirection::TokenToBase => (self.token_reserve, self.base_reserve),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.base_reserve == 0 || self.token_reserve == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        Ok(())
    }
}
