//! # Fundline Shared Types
//!
//! Numeric foundations for the fund accounting and AMM quote engines.
//!
//! ## Design Philosophy
//!
//! - **No Binary Floating Point**: Every financial value is a `rust_decimal::Decimal`
//! - **Minimal-Unit Discipline**: Divisions between token amounts happen on
//!   integer minimal units (see [`TokenAmount`])
//! - **Never Over-Promise**: A single rounding policy (see [`precision`])
//! - **One Error Taxonomy**: [`EngineError`] is what every engine returns
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{parse_decimal, TokenAmount};
//!
//! let amount = parse_decimal("100").unwrap();
//! let price = parse_decimal("1.25").unwrap();
//! let amount = TokenAmount::from_decimal(amount, 18).unwrap();
//! let price = TokenAmount::from_decimal(price, 18).unwrap();
//! assert_eq!(amount.checked_ratio(price).unwrap().to_string(), "80");
//! ```

pub mod common;
pub mod precision;

pub use common::errors::{EngineError, FixedPointError};
pub use common::fixed_point::{
    decimal_from_f64, parse_decimal, scale_factor, TokenAmount, MAX_DECIMALS, SHARE_DECIMALS,
};
pub use common::identifiers::{FundId, InvestorAddress, PoolId};

/// Re-exported so downstream crates name one Decimal type
pub use rust_decimal::Decimal;

pub type Result<T> = std::result::Result<T, EngineError>;
