//! Rounding policy for financial quantities
//!
//! One rule everywhere: when a value has to lose digits, it rounds in the
//! direction that can never over-promise to the user.
//!
//! - Shares minted for a deposit round **toward zero** at share precision.
//! - Amounts paid out for a redemption round **toward zero**.
//! - Minimum acceptable swap output rounds **toward zero**, so the bound
//!   handed to the executing transaction is never tighter than intended.
//!
//! ## Basis points
//!
//! Slippage tolerances and redeem fractions are integer basis points in
//! `[0, 10_000]`. `bps_of` and `apply_bps_haircut` do the scaling in Decimal.

use crate::common::errors::EngineError;
use crate::common::fixed_point::SHARE_DECIMALS;
use rust_decimal::{Decimal, RoundingStrategy};

/// 100% in basis points
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Round a share quantity to share precision, toward zero
pub fn round_shares(shares: Decimal) -> Decimal {
    shares.round_dp_with_strategy(SHARE_DECIMALS, RoundingStrategy::ToZero)
}

/// Round an asset amount to the asset's decimals, toward zero
pub fn round_amount(amount: Decimal, decimals: u32) -> Decimal {
    amount.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

fn check_bps(bps: u32) -> Result<Decimal, EngineError> {
    if bps > BPS_DENOMINATOR {
        return Err(EngineError::invalid_input(format!(
            "basis points {} exceed {}",
            bps, BPS_DENOMINATOR
        )));
    }
    Ok(Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR))
}

/// `value * bps / 10_000`
pub fn bps_of(value: Decimal, bps: u32) -> Result<Decimal, EngineError> {
    let fraction = check_bps(bps)?;
    value
        .checked_mul(fraction)
        .ok_or_else(|| EngineError::overflow("basis point scaling"))
}

/// `value * (1 - bps / 10_000)`
pub fn apply_bps_haircut(value: Decimal, bps: u32) -> Result<Decimal, EngineError> {
    let fraction = check_bps(bps)?;
    value
        .checked_mul(Decimal::ONE - fraction)
        .ok_or_else(|| EngineError::overflow("basis point haircut"))
}

/// True when `|a - b| <= tolerance`
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}
