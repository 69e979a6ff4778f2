//! Constant product (x*y=k) math with exact integer arithmetic
//!
//! Every division truncates, and every truncation is arranged so the pool
//! keeps the remainder: traders receive floor outputs, depositors supply
//! ceiling inputs, withdrawers receive floor shares of the reserves.

use crate::error::{AmmError, Result};

/// Swap fee numerator, taken from the input side (3 / 1000 = 0.3%)
pub const FEE_PER_MILLE: u128 = 3;

/// Fee denominator
pub const FEE_DENOMINATOR: u128 = 1000;

/// Constant product math functions
pub struct ConstantProductMath;

impl ConstantProductMath {
    /// Calculate the output amount for an exact input using x*y=k
    ///
    /// # Arguments
    /// * `amount_in` - Input amount (raw units)
    /// * `reserve_in` - Reserve of the asset being sold
    /// * `reserve_out` - Reserve of the asset being bought
    ///
    /// # Returns
    /// `reserve_out * in_after_fee / (reserve_in + in_after_fee)`, with the fee
    /// scaling kept in both numerator and denominator so nothing is lost
    /// before the final floor division.
    pub fn calculate_output_amount(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128> {
        if amount_in == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "input amount must be positive",
            });
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }

        let overflow = AmmError::Overflow {
            context: "swap output",
        };
        let amount_in_with_fee = amount_in
            .checked_mul(FEE_DENOMINATOR - FEE_PER_MILLE)
            .ok_or(overflow.clone())?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or(overflow.clone())?;
        let denominator = reserve_in
            .checked_mul(FEE_DENOMINATOR)
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(overflow)?;

        Ok(numerator / denominator)
    }

    /// Calculate the input required to receive exactly `amount_out`
    pub fn calculate_input_amount(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128> {
        if amount_out == 0 {
            return Err(AmmError::InvalidAmount {
                reason: "output amount must be positive",
            });
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                reason: "output exceeds reserves",
            });
        }

        let overflow = AmmError::Overflow {
            context: "swap input",
        };
        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|n| n.checked_mul(FEE_DENOMINATOR))
            .ok_or(overflow.clone())?;
        let denominator = (reserve_out - amount_out)
            .checked_mul(FEE_DENOMINATOR - FEE_PER_MILLE)
            .ok_or(overflow.clone())?;

        // Add 1 to round up (ensures sufficient input)
        (numerator / denominator).checked_add(1).ok_or(overflow)
    }

    /// Token units a deposit of `base_in` must bring to keep the pool ratio
    ///
    /// Rounded up so a depositor can never dilute existing providers.
    pub fn proportional_deposit(
        base_in: u128,
        base_reserve: u128,
        token_reserve: u128,
    ) -> Result<u128> {
        if base_reserve == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        Self::mul_div_ceil(base_in, token_reserve, base_reserve, "deposit ratio")
    }

    /// `amount * numerator / denominator`, rounded down
    pub fn mul_div_floor(
        amount: u128,
        numerator: u128,
        denominator: u128,
        context: &'static str,
    ) -> Result<u128> {
        if denominator == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "division by empty reserve",
            });
        }
        amount
            .checked_mul(numerator)
            .map(|product| product / denominator)
            .ok_or(AmmError::Overflow { context })
    }

    /// `amount * numerator / denominator`, rounded up
    pub fn mul_div_ceil(
        amount: u128,
        numerator: u128,
        denominator: u128,
        context: &'static str,
    ) -> Result<u128> {
        if denominator == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reason: "division by empty reserve",
            });
        }
        let product = amount
            .checked_mul(numerator)
            .ok_or(AmmError::Overflow { context })?;
        let quotient = product / denominator;
        if product % denominator == 0 {
            Ok(quotient)
        } else {
            quotient.checked_add(1).ok_or(AmmError::Overflow { context })
        }
    }
}
