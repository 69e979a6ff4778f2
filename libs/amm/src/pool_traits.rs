//! Pool trait definitions for a unified quoting interface

use crate::constant_product::FEE_PER_MILLE;
use crate::error::Result;
use crate::reserves::{ReserveState, SwapDirection};

/// Read-only pricing surface shared by reserve snapshots and live pools
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, direction: SwapDirection, amount_in: u128) -> Result<u128>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, direction: SwapDirection, amount_out: u128) -> Result<u128>;

    /// Current `(base, token)` reserves
    fn get_liquidity(&self) -> (u128, u128);

    /// Swap fee in parts per thousand
    fn get_fee_per_mille(&self) -> u32 {
        FEE_PER_MILLE as u32
    }
}

impl AmmPool for ReserveState {
    fn get_amount_out(&self, direction: SwapDirection, amount_in: u128) -> Result<u128> {
        self.quote(direction, amount_in)
    }

    fn get_amount_in(&self, direction: SwapDirection, amount_out: u128) -> Result<u128> {
        self.quote_exact_output(direction, amount_out)
    }

    fn get_liquidity(&self) -> (u128, u128) {
        (self.base_reserve(), self.token_reserve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_state_as_pool() {
        let reserves = ReserveState::from_reserves(1000, 2000).unwrap();
        let pool: &dyn AmmPool = &reserves;

        assert_eq!(pool.get_liquidity(), (1000, 2000));
        assert_eq!(pool.get_fee_per_mille(), 3);
        assert_eq!(pool.get_amount_out(SwapDirection::BaseToToken, 100).unwrap(), 181);
        assert_eq!(pool.get_amount_in(SwapDirection::BaseToToken, 181).unwrap(), 100);
    }
}
