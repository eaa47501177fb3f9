//! Swap quotes with slippage-bounded minimum output
//!
//! A quote is a pure function of a pool snapshot, the trade, and the
//! engine's fixed parameters. Nothing is cached between calls.

use crate::constant_product::ConstantProductMath;
use crate::pool::{PoolState, SwapDirection};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::precision::{apply_bps_haircut, BPS_DENOMINATOR};
use types::{EngineError, MAX_DECIMALS};

/// Fixed parameters of a quote engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    /// Quotes whose output reaches this fraction of the output reserve fail
    pub max_drain_fraction: Decimal,
    /// Slippage applied by [`QuoteEngine::quote_default_slippage`]
    pub default_slippage_bps: u32,
    /// Minimum output is truncated to this many decimals (the output token's)
    pub output_decimals: u32,
}

impl Default for QuoteParams {
    fn default() -> Self {
        Self {
            max_drain_fraction: dec!(0.99),
            default_slippage_bps: 200,
            output_decimals: 18,
        }
    }
}

impl QuoteParams {
    pub fn new(
        max_drain_fraction: Decimal,
        default_slippage_bps: u32,
        output_decimals: u32,
    ) -> Result<Self, EngineError> {
        if max_drain_fraction <= Decimal::ZERO || max_drain_fraction > Decimal::ONE {
            return Err(EngineError::invalid_input(format!(
                "max drain fraction must be in (0, 1], got {}",
                max_drain_fraction
            )));
        }
        if default_slippage_bps > BPS_DENOMINATOR {
            return Err(EngineError::invalid_input(format!(
                "default slippage {} bps exceeds {}",
                default_slippage_bps, BPS_DENOMINATOR
            )));
        }
        if output_decimals > MAX_DECIMALS {
            return Err(EngineError::invalid_input(format!(
                "output decimals {} exceed {}",
                output_decimals, MAX_DECIMALS
            )));
        }
        Ok(Self {
            max_drain_fraction,
            default_slippage_bps,
            output_decimals,
        })
    }
}

/// Expected output and the bound handed to the executing transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub amount_in: Decimal,
    pub direction: SwapDirection,
    pub amount_out_estimate: Decimal,
    /// `amount_out_estimate * (1 - slippage_bps / 10_000)`, truncated
    pub minimum_amount_out: Decimal,
    pub slippage_bps: u32,
    /// Move in the pool's marginal price caused by this trade, in percent
    pub price_impact_pct: Decimal,
}

/// Constant-product quote engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteEngine {
    params: QuoteParams,
}

impl QuoteEngine {
    pub fn new(params: QuoteParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &QuoteParams {
        &self.params
    }

    /// Quote selling `amount_in` into `pool` in `direction`
    ///
    /// Fails with `InvalidPoolState` for non-positive reserves,
    /// `InvalidQuoteInput` for a non-positive amount or slippage above
    /// 10_000 bps, and `InsufficientLiquidity` when the output would reach
    /// the configured fraction of the output reserve.
    pub fn quote(
        &self,
        pool: &PoolState,
        amount_in: Decimal,
        direction: SwapDirection,
        slippage_bps: u32,
    ) -> Result<SwapQuote, EngineError> {
        pool.validate()?;
        if amount_in <= Decimal::ZERO {
            return Err(EngineError::invalid_input(format!(
                "input amount must be positive, got {}",
                amount_in
            )));
        }
        if slippage_bps > BPS_DENOMINATOR {
            return Err(EngineError::invalid_input(format!(
                "slippage {} bps exceeds {}",
                slippage_bps, BPS_DENOMINATOR
            )));
        }

        let (reserve_in, reserve_out) = pool.reserves_for(direction);
        let amount_out_estimate =
            ConstantProductMath::output_amount(amount_in, reserve_in, reserve_out)?;

        let drain_limit = reserve_out
            .checked_mul(self.params.max_drain_fraction)
            .ok_or_else(|| EngineError::overflow("drain limit"))?;
        if amount_out_estimate >= drain_limit {
            warn!(
                %amount_in,
                %direction,
                amount_out = %amount_out_estimate,
                %reserve_out,
                "Quote would drain pool beyond safety threshold"
            );
            return Err(EngineError::InsufficientLiquidity {
                amount_out: amount_out_estimate,
                reserve_out,
                max_drain_fraction: self.params.max_drain_fraction,
            });
        }

        let minimum_amount_out = apply_bps_haircut(amount_out_estimate, slippage_bps)?
            .round_dp_with_strategy(self.params.output_decimals, RoundingStrategy::ToZero);

        let price_impact_pct =
            ConstantProductMath::price_impact_pct(amount_in, reserve_in, reserve_out)?;

        let quote = SwapQuote {
            amount_in,
            direction,
            amount_out_estimate,
            minimum_amount_out,
            slippage_bps,
            price_impact_pct,
        };
        debug!(
            %amount_in,
            %direction,
            amount_out = %quote.amount_out_estimate,
            minimum_out = %quote.minimum_amount_out,
            slippage_bps,
            "Swap quoted"
        );
        Ok(quote)
    }

    /// [`QuoteEngine::quote`] at the engine's default slippage
    pub fn quote_default_slippage(
        &self,
        pool: &PoolState,
        amount_in: Decimal,
        direction: SwapDirection,
    ) -> Result<SwapQuote, EngineError> {
        self.quote(pool, amount_in, direction, self.params.default_slippage_bps)
    }
}

/// Quote with default parameters (0.99 drain threshold, 18 output decimals)
pub fn quote(
    pool: &PoolState,
    amount_in: Decimal,
    direction: SwapDirection,
    slippage_bps: u32,
) -> Result<SwapQuote, EngineError> {
    QuoteEngine::default().quote(pool, amount_in, direction, slippage_bps)
}
