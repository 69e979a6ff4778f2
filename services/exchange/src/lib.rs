//! # LASwap Exchange - Token/Base Liquidity Pools
//!
//! ## Purpose
//!
//! Automated market maker engine: one constant-product pool per token, each
//! pairing the token with a shared base asset (ETH). Providers add and remove
//! liquidity for proportional shares; traders swap base for token, token for
//! base, or token for token through two pools.
//!
//! ## Integration Points
//!
//! - **Assets**: pools move funds through the [`TokenLedger`] capability; the
//!   caller grants allowances to each pool's address beforehand
//! - **Time**: every operation takes the caller's current timestamp and checks
//!   it against the request deadline
//! - **Indexers**: committed operations are journaled as [`PoolEvent`]s and
//!   logged through `tracing`
//! - **Configuration**: [`PoolRegistry::from_config`] creates the pools listed
//!   in an [`exchange_config::ExchangeConfig`]
//!
//! ## Architecture Role
//!
//! ```text
//! Caller → [PoolRegistry] lookup(token) → [PoolEngine] ──lock──► validate → compute → commit
//!                                              │                       │
//!                                              │              ReserveState + LiquidityLedger
//!                                              ▼
//! Caller → [Router] ── leg 1: pool A token→base ──► leg 2: pool B base→token
//!                      (commits alone)              (may fail; leg 1 stays)
//! ```
//!
//! ## Consistency Model
//!
//! Single-pool operations are atomic: one mutex per pool covers the whole
//! operation including asset movements. Pools never share a lock. The
//! router's composite swap is two atomic operations, not one; a second-leg
//! failure is reported as [`TokenToTokenOutcome::SecondLegFailed`].

pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod operations;
pub mod registry;
pub mod router;
pub mod token;

pub use engine::{PoolEngine, PoolRecord, PoolSnapshot, DEFAULT_JOURNAL_CAPACITY};
pub use error::{ExchangeError, Result};
pub use events::PoolEvent;
pub use logging::init_tracing;
pub use operations::{
    AddLiquidity, LiquidityReceipt, PendingOperation, Receipt, RemoveLiquidity, Swap, SwapReceipt,
    TokenToTokenSwap,
};
pub use registry::PoolRegistry;
pub use router::{Router, TokenToTokenOutcome};
pub use token::{InMemoryToken, TokenLedger, TransferError};

pub use amm::SwapDirection;
pub use types::{Address, Timestamp, TokenAmount};
