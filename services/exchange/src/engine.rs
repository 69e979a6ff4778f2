//! Pool Engine
//!
//! One [`PoolEngine`] per token/base pair. Every public operation takes the
//! pool's mutex for its whole validate → compute → commit sequence, asset
//! movements included, so no caller ever observes a half-applied operation on
//! a single pool.
//!
//! Commit discipline: reserve changes are computed on a copy of
//! [`ReserveState`], share issuance is checked up front, assets are moved,
//! and only then is the copy written back and the ledger updated. Any error
//! before that point leaves the pool exactly as it was.
//!
//! The one exception is a withdrawal whose token payout fails after the base
//! leg was paid and cannot be pulled back. That withdrawal is committed
//! anyway and the token leg is held in the pool as an owed balance, returned
//! as [`ExchangeError::PayoutDeferred`] and paid later by
//! [`PoolEngine::claim_owed`]. A pool's token ledger balance is therefore
//! `token_reserve + total_owed`.

use crate::error::{ExchangeError, Result};
use crate::events::PoolEvent;
use crate::operations::{
    AddLiquidity, LiquidityReceipt, PendingOperation, Receipt, RemoveLiquidity, Swap, SwapReceipt,
};
use crate::token::TokenLedger;
use amm::{AmmPool, LiquidityLedger, ReserveState, SwapDirection};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::{Address, Timestamp};

/// Namespace hashed with the token address to derive a pool's own address
pub const POOL_ADDRESS_NAMESPACE: &[u8] = b"laswap-pool-v1";

/// Events kept per pool before the oldest are dropped
pub const DEFAULT_JOURNAL_CAPACITY: usize = 65_536;

/// Point-in-time view of a pool for reporting and before/after comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub token: Address,
    pub pool_address: Address,
    pub base_reserve: u128,
    pub token_reserve: u128,
    pub total_shares: u128,
}

/// The durable part of a pool: reserves and the share ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub token: Address,
    pub reserves: ReserveState,
    pub ledger: LiquidityLedger,
    /// Token units owed to providers whose withdrawal payout was deferred
    #[serde(default)]
    pub owed: HashMap<Address, u128>,
}

#[derive(Debug, Default)]
struct PoolState {
    reserves: ReserveState,
    ledger: LiquidityLedger,
    owed: HashMap<Address, u128>,
    /// Bounded; undrained events past capacity are dropped oldest first
    journal: VecDeque<PoolEvent>,
}

pub struct PoolEngine {
    token: Address,
    pool_address: Address,
    base_asset: Arc<dyn TokenLedger>,
    token_asset: Arc<dyn TokenLedger>,
    journal_capacity: usize,
    state: Mutex<PoolState>,
}

impl fmt::Debug for PoolEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolEngine")
            .field("token", &self.token)
            .field("pool_address", &self.pool_address)
            .field("symbol", &self.token_asset.symbol())
            .finish_non_exhaustive()
    }
}

/// Reject requests whose deadline is behind the caller's clock
pub fn ensure_not_expired(deadline: Timestamp, now: Timestamp) -> Result<()> {
    if now > deadline {
        return Err(ExchangeError::Expired { deadline, now });
    }
    Ok(())
}

impl PoolEngine {
    /// Create an empty (dormant) pool for `token`
    pub fn new(
        token: Address,
        base_asset: Arc<dyn TokenLedger>,
        token_asset: Arc<dyn TokenLedger>,
    ) -> Self {
        Self {
            token,
            pool_address: Address::derive(POOL_ADDRESS_NAMESPACE, &token),
            base_asset,
            token_asset,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Keep at most `capacity` undrained events (minimum 1)
    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity.max(1);
        self
    }

    /// Rebuild a pool from its persisted record
    pub fn restore(
        record: PoolRecord,
        base_asset: Arc<dyn TokenLedger>,
        token_asset: Arc<dyn TokenLedger>,
    ) -> Result<Self> {
        if record.reserves.is_empty() != (record.ledger.total_shares() == 0) {
            return Err(ExchangeError::InvalidAmount {
                reason: "share supply must be zero exactly when reserves are",
            });
        }
        if !record.ledger.is_consistent() {
            return Err(ExchangeError::InvalidAmount {
                reason: "share balances do not sum to total supply",
            });
        }

        let pool = Self::new(record.token, base_asset, token_asset);
        {
            let mut state = pool.state.lock();
            state.reserves = record.reserves;
            state.ledger = record.ledger;
            state.owed = record.owed;
        }
        info!(
            "Restored pool {} with reserves ({}, {})",
            pool.token,
            record.reserves.base_reserve(),
            record.reserves.token_reserve()
        );
        Ok(pool)
    }

    pub fn token(&self) -> Address {
        self.token
    }

    /// Address holding the pool's assets in both token ledgers
    pub fn pool_address(&self) -> Address {
        self.pool_address
    }

    pub fn symbol(&self) -> &str {
        self.token_asset.symbol()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.lock();
        PoolSnapshot {
            token: self.token,
            pool_address: self.pool_address,
            base_reserve: state.reserves.base_reserve(),
            token_reserve: state.reserves.token_reserve(),
            total_shares: state.ledger.total_shares(),
        }
    }

    /// Copy of the durable state for persistence
    pub fn record(&self) -> PoolRecord {
        let state = self.state.lock();
        PoolRecord {
            token: self.token,
            reserves: state.reserves,
            ledger: state.ledger.clone(),
            owed: state.owed.clone(),
        }
    }

    pub fn reserves(&self) -> ReserveState {
        self.state.lock().reserves
    }

    pub fn shares_of(&self, provider: &Address) -> u128 {
        self.state.lock().ledger.balance_of(provider)
    }

    pub fn total_shares(&self) -> u128 {
        self.state.lock().ledger.total_shares()
    }

    pub fn is_dormant(&self) -> bool {
        self.state.lock().reserves.is_empty()
    }

    /// Token units per base unit
    pub fn spot_price(&self) -> Option<Decimal> {
        self.state.lock().reserves.spot_price()
    }

    /// Tokens a base-asset sale of `base_in` would currently return
    pub fn quote_base_for_token(&self, base_in: u128) -> Result<u128> {
        let amount = self.state.lock().reserves.quote_base_for_token(base_in)?;
        debug!("Quote {} base -> {} {}", base_in, amount, self.symbol());
        Ok(amount)
    }

    /// Base units a token sale of `token_in` would currently return
    pub fn quote_token_for_base(&self, token_in: u128) -> Result<u128> {
        let amount = self.state.lock().reserves.quote_token_for_base(token_in)?;
        debug!("Quote {} {} -> {} base", token_in, self.symbol(), amount);
        Ok(amount)
    }

    /// Input needed to receive exactly `amount_out` in `direction`
    pub fn quote_exact_output(&self, direction: SwapDirection, amount_out: u128) -> Result<u128> {
        Ok(self.state.lock().reserves.get_amount_in(direction, amount_out)?)
    }

    /// Token units held for `provider` after a deferred withdrawal payout
    pub fn owed_to(&self, provider: &Address) -> u128 {
        self.state.lock().owed.get(provider).copied().unwrap_or(0)
    }

    pub fn total_owed(&self) -> u128 {
        self.state.lock().owed.values().sum()
    }

    /// Hand accumulated events to an indexer, oldest first
    ///
    /// Indexers are expected to call this regularly; once the journal holds
    /// its capacity, each new event evicts the oldest one.
    pub fn drain_events(&self) -> Vec<PoolEvent> {
        self.state.lock().journal.drain(..).collect()
    }

    /// Run any single-pool operation
    pub fn execute(&self, operation: &PendingOperation, now: Timestamp) -> Result<Receipt> {
        match operation {
            PendingOperation::AddLiquidity(request) => {
                self.add_liquidity(request, now).map(Receipt::Liquidity)
            }
            PendingOperation::RemoveLiquidity(request) => {
                self.remove_liquidity(request, now).map(Receipt::Liquidity)
            }
            PendingOperation::BaseToTokenSwap(request) => {
                self.base_to_token_swap(request, now).map(Receipt::Swap)
            }
            PendingOperation::TokenToBaseSwap(request) => {
                self.token_to_base_swap(request, now).map(Receipt::Swap)
            }
        }
    }

    pub fn add_liquidity(&self, request: &AddLiquidity, now: Timestamp) -> Result<LiquidityReceipt> {
        let mut state = self.state.lock();
        self.add_liquidity_locked(&mut state, request, now)
            .inspect_err(|err| self.log_rejection("add_liquidity", &request.provider, err))
    }

    pub fn remove_liquidity(
        &self,
        request: &RemoveLiquidity,
        now: Timestamp,
    ) -> Result<LiquidityReceipt> {
        let mut state = self.state.lock();
        self.remove_liquidity_locked(&mut state, request, now)
            .inspect_err(|err| self.log_rejection("remove_liquidity", &request.provider, err))
    }

    /// Sell base asset for tokens
    pub fn base_to_token_swap(&self, request: &Swap, now: Timestamp) -> Result<SwapReceipt> {
        let mut state = self.state.lock();
        self.swap_locked(&mut state, SwapDirection::BaseToToken, request, now)
            .inspect_err(|err| self.log_rejection("base_to_token_swap", &request.trader, err))
    }

    /// Sell tokens for base asset
    pub fn token_to_base_swap(&self, request: &Swap, now: Timestamp) -> Result<SwapReceipt> {
        let mut state = self.state.lock();
        self.swap_locked(&mut state, SwapDirection::TokenToBase, request, now)
            .inspect_err(|err| self.log_rejection("token_to_base_swap", &request.trader, err))
    }

    /// Move LP shares between holders
    pub fn transfer_shares(&self, from: &Address, to: &Address, shares: u128) -> Result<()> {
        let mut state = self.state.lock();
        state.ledger.transfer(from, to, shares)?;
        self.record_event(
            &mut state,
            PoolEvent::SharesTransferred {
                token: self.token,
                from: *from,
                to: *to,
                shares,
            },
        );
        debug!("Pool {}: {} shares {} -> {}", self.token.short(), shares, from, to);
        Ok(())
    }

    /// Pay out token units held for `provider` by a deferred withdrawal
    ///
    /// On failure the owed balance is kept for a later attempt.
    pub fn claim_owed(&self, provider: &Address, now: Timestamp) -> Result<u128> {
        let mut state = self.state.lock();
        let amount = state.owed.get(provider).copied().unwrap_or(0);
        if amount == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "nothing owed to provider",
            });
        }

        self.pay(&*self.token_asset, provider, amount)
            .inspect_err(|err| self.log_rejection("claim_owed", provider, err))?;
        state.owed.remove(provider);
        self.record_event(
            &mut state,
            PoolEvent::OwedClaimed {
                token: self.token,
                provider: *provider,
                token_amount: amount,
                at: now,
            },
        );

        info!(
            "Pool {}: {} claimed {} owed {}",
            self.symbol(),
            provider.short(),
            amount,
            self.symbol()
        );
        Ok(amount)
    }

    fn add_liquidity_locked(
        &self,
        state: &mut PoolState,
        request: &AddLiquidity,
        now: Timestamp,
    ) -> Result<LiquidityReceipt> {
        // Validate
        ensure_not_expired(request.deadline, now)?;
        if request.base_in == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "base deposit must be positive",
            });
        }

        // Compute
        let token_in = if state.reserves.is_empty() {
            if request.token_in_desired == 0 {
                return Err(ExchangeError::InvalidAmount {
                    reason: "initial token deposit must be positive",
                });
            }
            request.token_in_desired
        } else {
            let required = state.reserves.required_token_deposit(request.base_in)?;
            if request.token_in_desired < required {
                return Err(ExchangeError::RatioMismatch {
                    required,
                    supplied: request.token_in_desired,
                });
            }
            required
        };
        if token_in < request.token_in_min {
            return Err(ExchangeError::SlippageExceeded {
                leg: "token deposit",
                actual: token_in,
                minimum: request.token_in_min,
            });
        }

        let shares = state
            .ledger
            .shares_for_deposit(request.base_in, state.reserves.base_reserve())?;
        if shares == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "deposit too small to mint shares",
            });
        }
        state.ledger.ensure_mintable(shares)?;

        let mut next = state.reserves;
        next.apply_add(request.base_in, token_in)?;

        // Move assets
        self.pull(&*self.base_asset, &request.provider, request.base_in)?;
        if let Err(err) = self.pull(&*self.token_asset, &request.provider, token_in) {
            self.refund(&*self.base_asset, &request.provider, request.base_in);
            return Err(err);
        }

        // Commit
        state.reserves = next;
        state.ledger.mint(&request.provider, shares)?;
        self.record_event(
            state,
            PoolEvent::LiquidityAdded {
                token: self.token,
                provider: request.provider,
                base_amount: request.base_in,
                token_amount: token_in,
                shares_minted: shares,
                at: now,
            },
        );

        info!(
            "Pool {}: {} added liquidity base={} token={} shares={} reserves=({}, {})",
            self.symbol(),
            request.provider.short(),
            request.base_in,
            token_in,
            shares,
            next.base_reserve(),
            next.token_reserve()
        );

        Ok(LiquidityReceipt {
            base_amount: request.base_in,
            token_amount: token_in,
            shares,
            total_shares: state.ledger.total_shares(),
        })
    }

    fn remove_liquidity_locked(
        &self,
        state: &mut PoolState,
        request: &RemoveLiquidity,
        now: Timestamp,
    ) -> Result<LiquidityReceipt> {
        // Validate
        ensure_not_expired(request.deadline, now)?;
        if state.reserves.is_empty() {
            return Err(ExchangeError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        if request.shares == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "share amount must be positive",
            });
        }
        state.ledger.ensure_burnable(&request.provider, request.shares)?;

        // Compute
        let (base_out, token_out) = state
            .reserves
            .quote_removal(request.shares, state.ledger.total_shares())?;
        if base_out == 0 || token_out == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "withdrawal too small to return both assets",
            });
        }
        if base_out < request.base_out_min {
            return Err(ExchangeError::SlippageExceeded {
                leg: "base withdrawal",
                actual: base_out,
                minimum: request.base_out_min,
            });
        }
        if token_out < request.token_out_min {
            return Err(ExchangeError::SlippageExceeded {
                leg: "token withdrawal",
                actual: token_out,
                minimum: request.token_out_min,
            });
        }

        let mut next = state.reserves;
        next.apply_remove(base_out, token_out)?;

        let owed_after = state
            .owed
            .get(&request.provider)
            .copied()
            .unwrap_or(0)
            .checked_add(token_out)
            .ok_or(ExchangeError::Overflow {
                context: "owed balance",
            })?;

        // Move assets
        self.pay(&*self.base_asset, &request.provider, base_out)?;
        if let Err(payout) = self.pay(&*self.token_asset, &request.provider, token_out) {
            if self.reclaim(&*self.base_asset, &request.provider, base_out) {
                return Err(payout);
            }

            // Base is already with the provider: settle the withdrawal and
            // hold the token leg in the pool
            let cause = match payout {
                ExchangeError::TransferRejected(cause) => cause,
                other => return Err(other),
            };
            state.reserves = next;
            state.ledger.burn(&request.provider, request.shares)?;
            state.owed.insert(request.provider, owed_after);
            self.record_event(
                state,
                PoolEvent::LiquidityRemoved {
                    token: self.token,
                    provider: request.provider,
                    base_amount: base_out,
                    token_amount: token_out,
                    shares_burned: request.shares,
                    at: now,
                },
            );
            self.record_event(
                state,
                PoolEvent::PayoutDeferred {
                    token: self.token,
                    provider: request.provider,
                    token_amount: token_out,
                    at: now,
                },
            );
            error!(
                "Pool {}: withdrawal by {} committed with {} {} owed: {}",
                self.symbol(),
                request.provider,
                token_out,
                self.symbol(),
                cause
            );
            return Err(ExchangeError::PayoutDeferred {
                owed: token_out,
                cause,
            });
        }

        // Commit
        state.reserves = next;
        state.ledger.burn(&request.provider, request.shares)?;
        self.record_event(
            state,
            PoolEvent::LiquidityRemoved {
                token: self.token,
                provider: request.provider,
                base_amount: base_out,
                token_amount: token_out,
                shares_burned: request.shares,
                at: now,
            },
        );

        info!(
            "Pool {}: {} removed liquidity base={} token={} shares={} reserves=({}, {})",
            self.symbol(),
            request.provider.short(),
            base_out,
            token_out,
            request.shares,
            next.base_reserve(),
            next.token_reserve()
        );

        Ok(LiquidityReceipt {
            base_amount: base_out,
            token_amount: token_out,
            shares: request.shares,
            total_shares: state.ledger.total_shares(),
        })
    }

    fn swap_locked(
        &self,
        state: &mut PoolState,
        direction: SwapDirection,
        request: &Swap,
        now: Timestamp,
    ) -> Result<SwapReceipt> {
        // Validate
        ensure_not_expired(request.deadline, now)?;
        if request.amount_in == 0 {
            return Err(ExchangeError::InvalidAmount {
                reason: "swap input must be positive",
            });
        }

        // Compute
        let amount_out = state.reserves.quote(direction, request.amount_in)?;
        if amount_out < request.min_out {
            return Err(ExchangeError::SlippageExceeded {
                leg: match direction {
                    SwapDirection::BaseToToken => "token output",
                    SwapDirection::TokenToBase => "base output",
                },
                actual: amount_out,
                minimum: request.min_out,
            });
        }

        let mut next = state.reserves;
        next.apply_swap_in_out(direction, request.amount_in, amount_out)?;

        // Move assets
        let (asset_in, asset_out) = match direction {
            SwapDirection::BaseToToken => (&*self.base_asset, &*self.token_asset),
            SwapDirection::TokenToBase => (&*self.token_asset, &*self.base_asset),
        };
        self.pull(asset_in, &request.trader, request.amount_in)?;
        if let Err(err) = self.pay(asset_out, &request.trader, amount_out) {
            self.refund(asset_in, &request.trader, request.amount_in);
            return Err(err);
        }

        // Commit
        state.reserves = next;
        let event = match direction {
            SwapDirection::BaseToToken => PoolEvent::TokenPurchase {
                token: self.token,
                buyer: request.trader,
                base_sold: request.amount_in,
                tokens_bought: amount_out,
                at: now,
            },
            SwapDirection::TokenToBase => PoolEvent::BasePurchase {
                token: self.token,
                buyer: request.trader,
                tokens_sold: request.amount_in,
                base_bought: amount_out,
                at: now,
            },
        };
        self.record_event(state, event);

        info!(
            "Pool {}: {} swapped {} {} for {} reserves=({}, {})",
            self.symbol(),
            request.trader.short(),
            direction,
            request.amount_in,
            amount_out,
            next.base_reserve(),
            next.token_reserve()
        );

        Ok(SwapReceipt {
            token: self.token,
            direction,
            amount_in: request.amount_in,
            amount_out,
            base_reserve: next.base_reserve(),
            token_reserve: next.token_reserve(),
        })
    }

    /// Pull `amount` from `from` into the pool (requires prior allowance)
    fn pull(&self, asset: &dyn TokenLedger, from: &Address, amount: u128) -> Result<()> {
        asset
            .transfer_from(&self.pool_address, from, &self.pool_address, amount)
            .map_err(ExchangeError::from)
    }

    /// Pay `amount` out of the pool's balance
    fn pay(&self, asset: &dyn TokenLedger, to: &Address, amount: u128) -> Result<()> {
        asset
            .transfer(&self.pool_address, to, amount)
            .map_err(ExchangeError::from)
    }

    /// Return an input pulled earlier in a failed operation
    fn refund(&self, asset: &dyn TokenLedger, to: &Address, amount: u128) {
        if let Err(err) = asset.transfer(&self.pool_address, to, amount) {
            error!(
                "Pool {}: refund of {} {} to {} failed: {}",
                self.symbol(),
                amount,
                asset.symbol(),
                to,
                err
            );
        }
    }

    /// Take back a payout made earlier in a failed operation
    ///
    /// Needs the recipient to have approved the pool. Returns whether the
    /// amount came back.
    fn reclaim(&self, asset: &dyn TokenLedger, from: &Address, amount: u128) -> bool {
        match self.pull(asset, from, amount) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "Pool {}: reclaiming {} {} from {} failed: {}",
                    self.symbol(),
                    amount,
                    asset.symbol(),
                    from,
                    err
                );
                false
            }
        }
    }

    fn record_event(&self, state: &mut PoolState, event: PoolEvent) {
        if state.journal.len() >= self.journal_capacity {
            state.journal.pop_front();
            warn!(
                "Pool {}: event journal full at {}, dropping oldest event",
                self.symbol(),
                self.journal_capacity
            );
        }
        state.journal.push_back(event);
    }

    fn log_rejection(&self, operation: &str, caller: &Address, err: &ExchangeError) {
        warn!(
            pool = %self.token,
            caller = %caller,
            kind = err.kind(),
            "{} rejected: {}",
            operation,
            err
        );
    }
}
