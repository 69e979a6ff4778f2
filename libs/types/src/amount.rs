//! Fixed-point token amounts
//!
//! The engine only ever sees raw integer units. [`TokenAmount`] is the
//! boundary type that converts between decimal strings such as `"0.005"`
//! and those units at a deployment-wide scale (18 for ETH-like assets).
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: parsing rejects digits beyond the token scale
//! - **Overflow Protection**: checked scaling, never wraps
//! - **Clear Boundaries**: `Decimal` appears only at conversion points

use crate::errors::AmountError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest scale `rust_decimal` can carry
pub const MAX_DECIMALS: u8 = 28;

/// Integer token units tagged with their decimal scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    units: u128,
    decimals: u8,
}

impl TokenAmount {
    pub const fn from_units(units: u128, decimals: u8) -> Self {
        Self { units, decimals }
    }

    pub const fn zero(decimals: u8) -> Self {
        Self { units: 0, decimals }
    }

    pub fn units(&self) -> u128 {
        self.units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Parse a human-readable amount into integer units
    ///
    /// This is the PRIMARY method for turning user input into engine amounts.
    ///
    /// # Examples
    /// ```
    /// use types::TokenAmount;
    ///
    /// let half = TokenAmount::parse("0.5", 18).unwrap();
    /// assert_eq!(half.units(), 500_000_000_000_000_000);
    /// ```
    pub fn parse(input: &str, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedScale { decimals });
        }

        let value = Decimal::from_str(input.trim()).map_err(|_| AmountError::InvalidDecimal {
            input: input.to_string(),
        })?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative {
                input: input.to_string(),
            });
        }

        let value = value.normalize();
        let scale = value.scale();
        if scale > u32::from(decimals) {
            return Err(AmountError::PrecisionLoss {
                input: input.to_string(),
                decimals,
            });
        }

        let overflow = || AmountError::Overflow {
            input: input.to_string(),
            decimals,
        };
        let factor = 10u128
            .checked_pow(u32::from(decimals) - scale)
            .ok_or_else(overflow)?;
        let units = value
            .mantissa()
            .unsigned_abs()
            .checked_mul(factor)
            .ok_or_else(overflow)?;

        Ok(Self { units, decimals })
    }

    /// Convert to `Decimal` for display or price math
    pub fn to_decimal(&self) -> Result<Decimal, AmountError> {
        let overflow = || AmountError::Overflow {
            input: self.units.to_string(),
            decimals: self.decimals,
        };
        let signed = i128::try_from(self.units).map_err(|_| overflow())?;
        Decimal::try_from_i128_with_scale(signed, u32::from(self.decimals)).map_err(|_| overflow())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.units);
        }

        // 10^39 overflows u128, so very wide scales fall back to raw units
        let Some(factor) = 10u128.checked_pow(u32::from(self.decimals)) else {
            return write!(f, "{}e-{}", self.units, self.decimals);
        };

        let whole = self.units / factor;
        let frac = self.units % factor;
        if frac == 0 {
            return write!(f, "{}", whole);
        }

        let width = usize::from(self.decimals);
        let digits = format!("{:0>width$}", frac, width = width);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
