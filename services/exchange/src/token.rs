//! Asset collaborator interface
//!
//! Pools never own token logic; they pull inputs and push outputs through a
//! [`TokenLedger`]. The base asset is modelled the same way as every token.
//! [`InMemoryToken`] is a complete ERC20-style ledger used by tests and
//! local simulations.

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use types::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("{owner} holds {available}, needs {needed}")]
    InsufficientBalance {
        owner: Address,
        needed: u128,
        available: u128,
    },

    #[error("{spender} may spend {available} of {owner}'s balance, needs {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    #[error("{reason}")]
    Rejected { reason: String },
}

/// Balance and transfer capability of one asset
pub trait TokenLedger: Send + Sync {
    /// Ticker used in log lines
    fn symbol(&self) -> &str;

    fn balance_of(&self, owner: &Address) -> u128;

    /// Move `amount` from `from` to `to` on behalf of `spender`
    ///
    /// Requires `from` to have approved `spender` beforehand.
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Move `amount` out of `from`'s own balance
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
struct TokenBook {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
}

impl TokenBook {
    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        let available = self.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                owner: *from,
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }

        // Credits are bounded by total supply, which already fits in u128
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

/// Thread-safe in-memory token with allowances
#[derive(Debug)]
pub struct InMemoryToken {
    symbol: String,
    book: Mutex<TokenBook>,
}

impl InMemoryToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            book: Mutex::new(TokenBook::default()),
        }
    }

    /// Create new units for `to`
    pub fn mint(&self, to: &Address, amount: u128) -> Result<(), TransferError> {
        let mut book = self.book.lock();
        let total = book
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected {
                reason: format!("{} supply overflow", self.symbol),
            })?;
        book.total_supply = total;
        *book.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s balance, replacing any previous value
    pub fn approve(&self, owner: &Address, spender: &Address, amount: u128) {
        self.book.lock().allowances.insert((*owner, *spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.book
            .lock()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.book.lock().total_supply
    }
}

impl TokenLedger for InMemoryToken {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.book.lock().balances.get(owner).copied().unwrap_or(0)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut book = self.book.lock();
        let key = (*from, *spender);
        let allowed = book.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(TransferError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                needed: amount,
                available: allowed,
            });
        }

        book.move_balance(from, to, amount)?;
        book.allowances.insert(key, allowed - amount);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        self.book.lock().move_balance(from, to, amount)
    }
}
