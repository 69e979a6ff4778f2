//! # LASwap Types
//!
//! Shared vocabulary for every LASwap crate.
//!
//! ## Design Philosophy
//!
//! - **Integer Amounts**: the engine works on raw `u128` units; decimal strings
//!   only exist at the boundary through [`TokenAmount`]
//! - **Explicit Identities**: providers, traders, pools and tokens are all
//!   20-byte [`Address`] values
//! - **Caller-Supplied Time**: [`Timestamp`] is whatever clock the caller uses;
//!   the engine never reads wall time itself
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Address, TokenAmount};
//!
//! let dai: Address = "0xD77b79BE3e85351fF0cbe78f1B58cf8d1064047C".parse().unwrap();
//! let amount = TokenAmount::parse("0.2", 18).unwrap();
//! assert!(!dai.is_zero());
//! assert_eq!(amount.to_string(), "0.2");
//! ```

pub mod address;
pub mod amount;
pub mod errors;

pub use address::Address;
pub use amount::{TokenAmount, MAX_DECIMALS};
pub use errors::{AddressError, AmountError};

/// Absolute time in seconds, compared against operation deadlines
pub type Timestamp = u64;
