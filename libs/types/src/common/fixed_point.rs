//! Fixed-point minimal-unit arithmetic for token amounts
//!
//! Token quantities on chain are integers in the token's smallest unit
//! (wei for an 18-decimal token, 1e-6 for USDC). Converting both operands of
//! a division to that integer representation first means every deposit of a
//! given size is truncated identically, whatever its magnitude, instead of
//! accumulating binary floating-point error.
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: Integer storage, truncation toward zero on entry
//! - **Overflow Protection**: Every conversion is checked
//! - **Transparency**: `f64` and text only cross in through [`decimal_from_f64`]
//!   and [`parse_decimal`], which reject non-finite input

use crate::common::errors::FixedPointError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest scale `rust_decimal` can represent
pub const MAX_DECIMALS: u32 = 28;

/// Decimals used for fund share quantities (ERC-20 share tokens)
pub const SHARE_DECIMALS: u32 = 18;

/// `10^decimals` as a Decimal
pub fn scale_factor(decimals: u32) -> Result<Decimal, FixedPointError> {
    if decimals > MAX_DECIMALS {
        return Err(FixedPointError::UnsupportedDecimals {
            decimals,
            max: MAX_DECIMALS,
        });
    }
    Decimal::try_from_i128_with_scale(10i128.pow(decimals), 0).map_err(|_| {
        FixedPointError::Overflow {
            value: format!("1e{}", decimals),
            decimals,
        }
    })
}

/// Token amount held as an integer count of minimal units
///
/// Examples:
/// - 1.5 WETH = TokenAmount { units: 1_500_000_000_000_000_000, decimals: 18 }
/// - 5 USDC = TokenAmount { units: 5_000_000, decimals: 6 }
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Raw amount in smallest units
    pub units: i128,
    /// Number of decimal places for this token
    pub decimals: u32,
}

impl TokenAmount {
    /// Zero in the given precision
    pub const fn zero(decimals: u32) -> Self {
        Self { units: 0, decimals }
    }

    /// Create from raw minimal units
    pub const fn from_units(units: i128, decimals: u32) -> Self {
        Self { units, decimals }
    }

    /// Convert a decimal value to minimal units, truncating toward zero
    ///
    /// Digits beyond `decimals` cannot exist on chain, so they are dropped
    /// rather than rounded up.
    pub fn from_decimal(value: Decimal, decimals: u32) -> Result<Self, FixedPointError> {
        let factor = scale_factor(decimals)?;
        let scaled = value
            .checked_mul(factor)
            .ok_or_else(|| FixedPointError::Overflow {
                value: value.to_string(),
                decimals,
            })?
            .round_dp_with_strategy(0, RoundingStrategy::ToZero);

        let units = scaled.to_i128().ok_or_else(|| FixedPointError::Overflow {
            value: value.to_string(),
            decimals,
        })?;

        Ok(Self { units, decimals })
    }

    /// Convert back to a decimal value
    pub fn to_decimal(self) -> Result<Decimal, FixedPointError> {
        Decimal::try_from_i128_with_scale(self.units, self.decimals).map_err(|_| {
            FixedPointError::Overflow {
                value: self.units.to_string(),
                decimals: self.decimals,
            }
        })
    }

    /// Exact ratio `self / rhs` of two amounts in the same precision
    ///
    /// Both operands are integers, so the only rounding is the final
    /// 28-significant-digit division.
    pub fn checked_ratio(self, rhs: Self) -> Result<Decimal, FixedPointError> {
        if self.decimals != rhs.decimals {
            return Err(FixedPointError::DecimalsMismatch {
                left: self.decimals,
                right: rhs.decimals,
            });
        }
        if rhs.units == 0 {
            return Err(FixedPointError::DivisionByZero);
        }

        let numerator = units_as_decimal(self)?;
        let denominator = units_as_decimal(rhs)?;
        numerator
            .checked_div(denominator)
            .ok_or_else(|| FixedPointError::Overflow {
                value: self.units.to_string(),
                decimals: self.decimals,
            })
    }

    /// Checked addition - returns None on overflow or mismatched precision
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        if self.decimals != rhs.decimals {
            return None;
        }
        self.units.checked_add(rhs.units).map(|units| Self {
            units,
            decimals: self.decimals,
        })
    }

    /// Checked subtraction - returns None on overflow or mismatched precision
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        if self.decimals != rhs.decimals {
            return None;
        }
        self.units.checked_sub(rhs.units).map(|units| Self {
            units,
            decimals: self.decimals,
        })
    }

    pub fn is_positive(self) -> bool {
        self.units > 0
    }
}

fn units_as_decimal(amount: TokenAmount) -> Result<Decimal, FixedPointError> {
    Decimal::try_from_i128_with_scale(amount.units, 0).map_err(|_| FixedPointError::Overflow {
        value: amount.units.to_string(),
        decimals: amount.decimals,
    })
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{}", value),
            Err(_) => write!(f, "{}e-{}", self.units, self.decimals),
        }
    }
}

/// Convert an `f64` from a UI or feed boundary into a Decimal
///
/// NaN and infinities are rejected outright. Finite values keep the shortest
/// representation that round-trips the float.
pub fn decimal_from_f64(value: f64) -> Result<Decimal, FixedPointError> {
    if !value.is_finite() {
        return Err(FixedPointError::NotFinite { value });
    }
    Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{:e}", value)))
        .map_err(|_| FixedPointError::Overflow {
            value: value.to_string(),
            decimals: MAX_DECIMALS,
        })
}

/// Parse a decimal string exactly
///
/// This is the PRIMARY method for creating amounts from external data:
/// JSON, configuration files, user input. Scientific notation is accepted.
pub fn parse_decimal(input: &str) -> Result<Decimal, FixedPointError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| FixedPointError::InvalidDecimal {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(0).unwrap(), dec!(1));
        assert_eq!(scale_factor(6).unwrap(), dec!(1000000));
        assert_eq!(
            scale_factor(18).unwrap(),
            dec!(1000000000000000000)
        );
        assert!(matches!(
            scale_factor(29),
            Err(FixedPointError::UnsupportedDecimals { decimals: 29, .. })
        ));
    }

    #[test]
    fn test_from_decimal_truncates_toward_zero() {
        let usdc = TokenAmount::from_decimal(dec!(1.2345678), 6).unwrap();
        assert_eq!(usdc.units, 1_234_567);

        let weth = TokenAmount::from_decimal(dec!(1.5), 18).unwrap();
        assert_eq!(weth.units, 1_500_000_000_000_000_000);
        assert_eq!(weth.to_decimal().unwrap(), dec!(1.5));
    }

    #[test]
    fn test_checked_ratio() {
        let amount = TokenAmount::from_decimal(dec!(100), 18).unwrap();
        let price = TokenAmount::from_decimal(dec!(1.25), 18).unwrap();
        assert_eq!(amount.checked_ratio(price).unwrap(), dec!(80));

        let usdc = TokenAmount::from_decimal(dec!(1), 6).unwrap();
        assert_eq!(
            amount.checked_ratio(usdc),
            Err(FixedPointError::DecimalsMismatch { left: 18, right: 6 })
        );
        assert_eq!(
            amount.checked_ratio(TokenAmount::zero(18)),
            Err(FixedPointError::DivisionByZero)
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = TokenAmount::from_units(5, 6);
        let b = TokenAmount::from_units(3, 6);
        assert_eq!(a.checked_add(b), Some(TokenAmount::from_units(8, 6)));
        assert_eq!(a.checked_sub(b), Some(TokenAmount::from_units(2, 6)));
        assert_eq!(a.checked_add(TokenAmount::from_units(1, 18)), None);
    }

    #[test]
    fn test_boundary_conversions_reject_non_finite() {
        assert!(matches!(
            decimal_from_f64(f64::NAN),
            Err(FixedPointError::NotFinite { .. })
        ));
        assert!(matches!(
            decimal_from_f64(f64::INFINITY),
            Err(FixedPointError::NotFinite { .. })
        ));
        assert_eq!(decimal_from_f64(0.04).unwrap(), dec!(0.04));
        assert_eq!(decimal_from_f64(40475.3).unwrap(), dec!(40475.3));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 123.456 ").unwrap(), dec!(123.456));
        assert_eq!(parse_decimal("1e-4").unwrap(), dec!(0.0001));
        assert!(matches!(
            parse_decimal("NaN"),
            Err(FixedPointError::InvalidDecimal { .. })
        ));
        assert!(parse_decimal("").is_err());
    }
}
