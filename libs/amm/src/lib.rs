//! # LASwap AMM Library - Constant Product Pool Mathematics
//!
//! ## Purpose
//!
//! Exact integer arithmetic for token/base liquidity pools: swap quotes under
//! the x*y=k invariant with a fixed 0.3% input-side fee, proportional deposit
//! requirements, and liquidity share issuance and redemption. No floating
//! point touches a balance; `Decimal` is only used to report spot prices.
//!
//! ## Integration Points
//!
//! - **Consumers**: `laswap-exchange` pool engines apply these primitives
//!   under a per-pool lock and publish the results
//! - **State**: [`ReserveState`] and [`LiquidityLedger`] are the only durable
//!   per-pool state; both serialize with serde
//! - **Rounding**: every truncation favours the pool
//!
//! ## Architecture Role
//!
//! ```text
//! Caller request → [PoolEngine] → quote (ReserveState) → issue/redeem (LiquidityLedger)
//!                        ↓
//!                 commit copies of both once asset transfers succeed
//! ```

pub mod constant_product;
pub mod error;
pub mod ledger;
pub mod pool_traits;
pub mod reserves;

pub use constant_product::{ConstantProductMath, FEE_DENOMINATOR, FEE_PER_MILLE};
pub use error::AmmError;
pub use ledger::LiquidityLedger;
pub use pool_traits::AmmPool;
pub use reserves::{ReserveState, SwapDirection};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_reserves()
            (base in 1_000u128..1_000_000_000_000u128,
             token in 1_000u128..1_000_000_000_000u128) -> ReserveState {
            ReserveState::from_reserves(base, token).unwrap()
        }
    }

    proptest! {
        #[test]
        fn swap_never_decreases_invariant(
            reserves in valid_reserves(),
            amount_in in 1u128..10_000_000_000u128,
            base_side in any::<bool>(),
        ) {
            let direction = if base_side {
                SwapDirection::BaseToToken
            } else {
                SwapDirection::TokenToBase
            };
            if let Ok(out) = reserves.quote(direction, amount_in) {
                let mut next = reserves;
                next.apply_swap_in_out(direction, amount_in, out).unwrap();
                prop_assert!(next.invariant().unwrap() > reserves.invariant().unwrap());
            }
        }

        #[test]
        fn removal_never_exceeds_reserves(
            reserves in valid_reserves(),
            total in 1u128..1_000_000_000u128,
            fraction in 0u128..=1000u128,
        ) {
            let shares = total * fraction / 1000;
            let (base_out, token_out) = reserves.quote_removal(shares, total).unwrap();
            prop_assert!(base_out <= reserves.base_reserve());
            prop_assert!(token_out <= reserves.token_reserve());
        }
    }
}
