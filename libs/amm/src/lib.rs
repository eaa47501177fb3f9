//! # Fundline AMM Library - Constant-Product Quote Engine
//!
//! ## Purpose
//!
//! Quotes swaps against a two-asset constant-product pool so that the
//! fund's deposit/redeem flow can show an expected output and hand a
//! slippage-bounded minimum to the trade executor. Exact `Decimal`
//! arithmetic end to end; a tiny output against a huge reserve keeps every
//! significant digit.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots from a [`ReserveSource`], amounts and
//!   slippage from the deposit/redeem panel
//! - **Output Destinations**: [`SwapQuote`] for display, [`TradeRequest`] for
//!   a [`TradeExecutor`]
//! - **Safety**: Quotes that would take 99% or more of the output reserve are
//!   refused with `InsufficientLiquidity`
//!
//! ## Architecture Role
//!
//! ```text
//! ReserveSource ──► PoolState ──► QuoteEngine::quote ──► SwapQuote
//!                                        ▲                   │
//!                  QuoteSession ─────────┘                   ▼
//!                  (direction, amount, last quote)      TradeRequest ──► TradeExecutor
//! ```

pub mod constant_product;
pub mod pool;
pub mod quote;
pub mod session;

pub use constant_product::ConstantProductMath;
pub use pool::{PoolState, ReserveSource, StaticReserves, SwapDirection};
pub use quote::{quote, QuoteEngine, QuoteParams, SwapQuote};
pub use session::{ExecutionId, QuoteSession, TradeExecutor, TradeRequest};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
