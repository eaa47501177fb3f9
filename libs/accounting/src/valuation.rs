//! Valuing fund figures in an external quote currency
//!
//! Exchange rates come from a read-only price feed outside this crate. They
//! are passed in as values; nothing here fetches or caches them.

use crate::fold::FundState;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::EngineError;

/// A point-in-time `base -> quote` rate, e.g. WETH -> USD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base: String,
    pub quote: String,
    pub rate: Decimal,
}

impl ExchangeRate {
    pub fn new(
        base: impl Into<String>,
        quote: impl Into<String>,
        rate: Decimal,
    ) -> Result<Self, EngineError> {
        if rate <= Decimal::ZERO {
            return Err(EngineError::invalid_input(format!(
                "exchange rate must be positive, got {}",
                rate
            )));
        }
        Ok(Self {
            base: base.into(),
            quote: quote.into(),
            rate,
        })
    }

    /// `amount` of base expressed in quote
    pub fn convert(&self, amount: Decimal) -> Result<Decimal, EngineError> {
        amount
            .checked_mul(self.rate)
            .ok_or_else(|| EngineError::overflow("exchange rate conversion"))
    }
}

/// Fund NAV in the rate's quote currency
pub fn nav_in_quote(state: &FundState, rate: &ExchangeRate) -> Result<Decimal, EngineError> {
    rate.convert(state.nav_denomination)
}

/// Percentage change from `previous` to `current` share price
pub fn share_price_change_pct(previous: Decimal, current: Decimal) -> Result<Decimal, EngineError> {
    if previous <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "previous share price must be positive, got {}",
            previous
        )));
    }
    (current - previous)
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| EngineError::overflow("share price change"))
}

/// Gross asset value observed at a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GavPoint {
    pub block_number: u64,
    pub gav: Decimal,
}

/// Exchange rate observed at a labelled point (usually a date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePoint {
    pub label: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationPoint {
    pub label: String,
    pub value: Decimal,
}

/// Pair a GAV history with rates by position
///
/// Where the rate series is shorter than the GAV series, `fallback_rate`
/// applies and the point is labelled `#<block>`.
pub fn valuation_history(
    gav_history: &[GavPoint],
    rates: &[RatePoint],
    fallback_rate: Decimal,
) -> Result<Vec<ValuationPoint>, EngineError> {
    if fallback_rate <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "fallback rate must be positive, got {}",
            fallback_rate
        )));
    }

    gav_history
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (label, rate) = match rates.get(i) {
                Some(r) => (r.label.clone(), r.rate),
                None => (format!("#{}", point.block_number), fallback_rate),
            };
            let value = point
                .gav
                .checked_mul(rate)
                .ok_or_else(|| EngineError::overflow("valuation history"))?;
            Ok(ValuationPoint { label, value })
        })
        .collect()
}
