//! Liquidity share accounting
//!
//! A pool's [`LiquidityLedger`] records how many share units each provider
//! holds. Shares are minted on deposit, burned on withdrawal and move between
//! holders only through [`LiquidityLedger::transfer`]. The sum of all balances
//! always equals [`LiquidityLedger::total_shares`].

use crate::constant_product::ConstantProductMath;
use crate::error::{AmmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::Address;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLedger {
    balances: HashMap<Address, u128>,
    total_shares: u128,
}

impl LiquidityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, provider: &Address) -> u128 {
        self.balances.get(provider).copied().unwrap_or(0)
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Number of providers with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Shares to issue for a deposit of `base_in` against the pre-deposit reserve
    ///
    /// The first deposit is denominated in base units one-to-one; later
    /// deposits receive `total_shares * base_in / base_reserve`, rounded down.
    pub fn shares_for_deposit(&self, base_in: u128, base_reserve: u128) -> Result<u128> {
        if base_in == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "deposit must include base asset",
            });
        }
        if self.total_shares == 0 {
            return Ok(base_in);
        }
        ConstantProductMath::mul_div_floor(base_in, self.total_shares, base_reserve, "share issuance")
    }

    /// Check that `shares` can be minted without overflowing the supply
    pub fn ensure_mintable(&self, shares: u128) -> Result<()> {
        self.total_shares
            .checked_add(shares)
            .map(|_| ())
            .ok_or(AmmError::Overflow {
                context: "share supply",
            })
    }

    /// Check that `provider` holds at least `shares`
    pub fn ensure_burnable(&self, provider: &Address, shares: u128) -> Result<()> {
        let available = self.balance_of(provider);
        if shares > available {
            return Err(AmmError::InsufficientShares {
                requested: shares,
                available,
            });
        }
        Ok(())
    }

    pub fn mint(&mut self, provider: &Address, shares: u128) -> Result<()> {
        if shares == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "cannot mint zero shares",
            });
        }
        self.ensure_mintable(shares)?;

        // A balance never exceeds the total, so it cannot overflow either
        self.total_shares += shares;
        *self.balances.entry(*provider).or_insert(0) += shares;
        Ok(())
    }

    pub fn burn(&mut self, provider: &Address, shares: u128) -> Result<()> {
        if shares == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "cannot burn zero shares",
            });
        }
        self.ensure_burnable(provider, shares)?;

        self.total_shares -= shares;
        self.debit(provider, shares);
        Ok(())
    }

    /// Move `shares` from one holder to another; total supply is unchanged
    pub fn transfer(&mut self, from: &Address, to: &Address, shares: u128) -> Result<()> {
        if shares == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "cannot transfer zero shares",
            });
        }
        self.ensure_burnable(from, shares)?;
        if from == to {
            return Ok(());
        }

        self.debit(from, shares);
        *self.balances.entry(*to).or_insert(0) += shares;
        Ok(())
    }

    /// Sum of balances equals the recorded total
    pub fn is_consistent(&self) -> bool {
        self.balances
            .values()
            .try_fold(0u128, |acc, balance| acc.checked_add(*balance))
            == Some(self.total_shares)
    }

    fn debit(&mut self, provider: &Address, shares: u128) {
        if let Some(balance) = self.balances.get_mut(provider) {
            *balance -= shares;
            if *balance == 0 {
                self.balances.remove(provider);
            }
        }
    }
}
