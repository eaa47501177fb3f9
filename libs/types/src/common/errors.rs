//! Error types for the accounting and quote engines
//!
//! `EngineError` is the complete taxonomy returned by the pure engine
//! operations. `FixedPointError` covers minimal-unit conversion failures and
//! folds into `EngineError` so callers only ever match one enum.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by the fund accounting and AMM quote engines
///
/// Every variant is a local, pure-computation failure. None of them are
/// retryable: the same inputs always produce the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Numeric input is non-finite, non-positive or out of range
    #[error("Invalid quote input: {reason}")]
    InvalidQuoteInput { reason: String },

    /// One or both pool reserves are not strictly positive
    #[error("Invalid pool state: reserves ({reserve_a}, {reserve_b}) must both be positive")]
    InvalidPoolState {
        reserve_a: Decimal,
        reserve_b: Decimal,
    },

    /// Trade would remove more than the allowed fraction of the output reserve
    #[error(
        "Insufficient liquidity: output {amount_out} reaches {max_drain_fraction} of reserve {reserve_out}"
    )]
    InsufficientLiquidity {
        amount_out: Decimal,
        reserve_out: Decimal,
        max_drain_fraction: Decimal,
    },

    /// A redeem would push outstanding shares below zero
    #[error(
        "Negative share balance at entry {index}: {outstanding} outstanding, {requested} requested"
    )]
    NegativeShareBalance {
        index: usize,
        outstanding: Decimal,
        requested: Decimal,
    },

    /// Checked decimal arithmetic overflowed the 96-bit mantissa
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidQuoteInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidQuoteInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EngineError::ArithmeticOverflow`]
    pub fn overflow(context: &'static str) -> Self {
        Self::ArithmeticOverflow { context }
    }
}

/// Errors that can occur during fixed-point conversion
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixedPointError {
    /// Value does not fit in the minimal-unit integer representation
    #[error("Overflow: {value} cannot be represented with {decimals} decimals")]
    Overflow { value: String, decimals: u32 },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in fixed-point arithmetic")]
    DivisionByZero,

    /// Value is not finite (NaN or infinity)
    #[error("Value is not finite: {value}")]
    NotFinite { value: f64 },

    /// Operands carry different decimal scales
    #[error("Decimals mismatch: {left} vs {right}")]
    DecimalsMismatch { left: u32, right: u32 },

    /// Token decimals outside the supported range
    #[error("Unsupported decimals: {decimals} (max {max})")]
    UnsupportedDecimals { decimals: u32, max: u32 },
}

impl From<FixedPointError> for EngineError {
    fn from(err: FixedPointError) -> Self {
        match err {
            FixedPointError::Overflow { .. } => EngineError::overflow("fixed-point conversion"),
            other => EngineError::invalid_input(other.to_string()),
        }
    }
}
