//! Share and redemption estimates at a given share price
//!
//! Deposit amounts are truncated to the denomination asset's minimal units
//! before dividing, so every deposit of a given size is credited identically
//! whatever its magnitude. Share prices are never truncated: a price finer
//! than one minimal unit still divides exactly.

use rust_decimal::Decimal;
use tracing::{debug, warn};
use types::precision::{bps_of, round_amount, round_shares};
use types::{EngineError, TokenAmount, SHARE_DECIMALS};

fn require_positive(value: Decimal, what: &str) -> Result<(), EngineError> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "{} must be positive, got {}",
            what, value
        )));
    }
    Ok(())
}

/// `value` truncated to `decimals`, rejected if nothing is left
fn truncate_positive(value: Decimal, decimals: u32, what: &str) -> Result<Decimal, EngineError> {
    let truncated = TokenAmount::from_decimal(value, decimals)?.to_decimal()?;
    if truncated <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "{} {} is below one minimal unit at {} decimals",
            what, value, decimals
        )));
    }
    Ok(truncated)
}

fn checked_value(shares: Decimal, price: Decimal) -> Result<Decimal, EngineError> {
    shares
        .checked_mul(price)
        .ok_or_else(|| EngineError::overflow("share value"))
}

/// Shares a deposit of `amount` would mint at `current_share_price`
///
/// The amount is truncated to the denomination asset's minimal units and
/// divided by the exact price. The quotient is rounded toward zero at share
/// precision, and stepped down one unit in the last place if the division
/// itself rounded up, so `shares * price` never exceeds the amount paid.
pub fn estimate_shares_for_deposit(
    amount: Decimal,
    current_share_price: Decimal,
    denomination_decimals: u32,
) -> Result<Decimal, EngineError> {
    require_positive(amount, "deposit amount")?;
    require_positive(current_share_price, "share price")?;

    let paid = truncate_positive(amount, denomination_decimals, "deposit amount")?;
    let quotient = paid
        .checked_div(current_share_price)
        .ok_or_else(|| EngineError::overflow("deposit share quotient"))?;

    let mut shares = round_shares(quotient);
    if checked_value(shares, current_share_price)? > paid {
        shares -= Decimal::new(1, shares.scale());
    }

    debug!(%amount, price = %current_share_price, %shares, "Estimated deposit shares");
    Ok(shares)
}

/// Denomination amount a redemption of `shares` would pay at `current_share_price`
///
/// Shares are truncated to share precision and multiplied by the exact
/// price; the product is rounded toward zero at share precision.
pub fn estimate_redemption_value(
    shares: Decimal,
    current_share_price: Decimal,
) -> Result<Decimal, EngineError> {
    require_positive(shares, "redeem shares")?;
    require_positive(current_share_price, "share price")?;

    let burned = round_shares(shares);
    if burned <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "redeem shares {} is below one minimal unit at {} decimals",
            shares, SHARE_DECIMALS
        )));
    }

    let amount = round_amount(
        checked_value(burned, current_share_price)?,
        SHARE_DECIMALS,
    );
    debug!(%shares, price = %current_share_price, %amount, "Estimated redemption value");
    Ok(amount)
}

/// Deposit estimate for a live input field
///
/// Shows `0` while the input is incomplete or invalid. Committed paths must
/// use [`estimate_shares_for_deposit`] and handle its error.
pub fn live_share_estimate(
    amount: Decimal,
    current_share_price: Decimal,
    denomination_decimals: u32,
) -> Decimal {
    match estimate_shares_for_deposit(amount, current_share_price, denomination_decimals) {
        Ok(shares) => shares,
        Err(EngineError::InvalidQuoteInput { .. }) => Decimal::ZERO,
        Err(err) => {
            warn!(%err, "Live share estimate failed");
            Decimal::ZERO
        }
    }
}

/// `fraction_bps` of an investor's current shares, e.g. 2_500 for a quarter
pub fn redeem_fraction(current_shares: Decimal, fraction_bps: u32) -> Result<Decimal, EngineError> {
    if current_shares < Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "current shares cannot be negative, got {}",
            current_shares
        )));
    }
    Ok(round_shares(bps_of(current_shares, fraction_bps)?))
}
