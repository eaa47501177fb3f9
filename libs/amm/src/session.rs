//! Caller-owned quote state for a deposit/redeem or swap panel
//!
//! The session remembers the chosen direction, the typed input and the last
//! quote. Changing the input invalidates the quote; changing the direction
//! also drops the input so no value ever carries across a direction switch.

use crate::pool::{PoolState, SwapDirection};
use crate::quote::{QuoteEngine, SwapQuote};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use types::EngineError;

/// The argument tuple handed to the trade-execution collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub direction: SwapDirection,
    pub amount_in: Decimal,
    pub minimum_amount_out: Decimal,
}

impl From<&SwapQuote> for TradeRequest {
    fn from(quote: &SwapQuote) -> Self {
        Self {
            direction: quote.direction,
            amount_in: quote.amount_in,
            minimum_amount_out: quote.minimum_amount_out,
        }
    }
}

/// Opaque identifier returned by an executor, usually a transaction hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(pub String);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submits a trade and reports its identifier
///
/// Nothing in this crate calls an executor; the session only builds the
/// request it receives.
pub trait TradeExecutor {
    fn execute(&self, request: &TradeRequest) -> Result<ExecutionId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedQuote {
    quote: SwapQuote,
    snapshot_ms: u64,
}

/// Stateful holder of one direction, one input amount and at most one quote
#[derive(Debug, Clone)]
pub struct QuoteSession {
    engine: QuoteEngine,
    direction: SwapDirection,
    amount_in: Option<Decimal>,
    slippage_bps: u32,
    last_quote: Option<CachedQuote>,
}

impl QuoteSession {
    pub fn new(engine: QuoteEngine, direction: SwapDirection) -> Self {
        let slippage_bps = engine.params().default_slippage_bps;
        Self {
            engine,
            direction,
            amount_in: None,
            slippage_bps,
            last_quote: None,
        }
    }

    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    pub fn amount_in(&self) -> Option<Decimal> {
        self.amount_in
    }

    pub fn slippage_bps(&self) -> u32 {
        self.slippage_bps
    }

    /// The last quote, if one was derived for the current direction and amount
    pub fn quote(&self) -> Option<&SwapQuote> {
        self.last_quote.as_ref().map(|cached| &cached.quote)
    }

    pub fn set_amount_in(&mut self, amount_in: Decimal) {
        if self.amount_in != Some(amount_in) {
            self.amount_in = Some(amount_in);
            self.last_quote = None;
        }
    }

    pub fn set_slippage_bps(&mut self, slippage_bps: u32) {
        if self.slippage_bps != slippage_bps {
            self.slippage_bps = slippage_bps;
            self.last_quote = None;
        }
    }

    /// Flip the direction, dropping the typed amount and any quote
    pub fn switch_direction(&mut self) {
        self.direction = self.direction.reversed();
        self.clear();
        debug!(direction = %self.direction, "Quote session direction switched");
    }

    /// Drop the typed amount and any quote
    pub fn clear(&mut self) {
        self.amount_in = None;
        self.last_quote = None;
    }

    /// Derive a quote from a fresh pool snapshot taken at `snapshot_ms`
    ///
    /// With no amount entered there is nothing to quote and `None` is
    /// returned. A failed quote also drops the previous one.
    pub fn refresh(
        &mut self,
        pool: &PoolState,
        snapshot_ms: u64,
    ) -> Result<Option<&SwapQuote>, EngineError> {
        let Some(amount_in) = self.amount_in else {
            self.last_quote = None;
            return Ok(None);
        };

        match self
            .engine
            .quote(pool, amount_in, self.direction, self.slippage_bps)
        {
            Ok(quote) => {
                self.last_quote = Some(CachedQuote { quote, snapshot_ms });
                Ok(self.quote())
            }
            Err(e) => {
                self.last_quote = None;
                Err(e)
            }
        }
    }

    /// Whether the reserves behind the current quote must be re-read
    ///
    /// A session without a quote is always stale.
    pub fn is_stale(&self, now_ms: u64, refresh_interval_ms: u64) -> bool {
        match &self.last_quote {
            Some(cached) => now_ms.saturating_sub(cached.snapshot_ms) >= refresh_interval_ms,
            None => true,
        }
    }

    /// Execution arguments for the current quote, if there is one
    pub fn trade_request(&self) -> Option<TradeRequest> {
        let cached = self.last_quote.as_ref()?;
        let matches_input = cached.quote.direction == self.direction
            && Some(cached.quote.amount_in) == self.amount_in;
        matches_input.then(|| TradeRequest::from(&cached.quote))
    }
}
