//! # Fundline Fund Accounting Engine
//!
//! ## Purpose
//!
//! Turns an ordered deposit/redeem ledger into outstanding shares, NAV,
//! share price and per-investor positions. It is the single source of
//! truth for share price everywhere else in the system.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Ordered ledger entries from a [`LedgerSource`]
//! - **Output Destinations**: Dashboards, the deposit/redeem panel, and the
//!   AMM quote engine when valuing fund-held assets
//! - **Precision**: `Decimal` throughout, minimal-unit conversion before
//!   every share/amount division
//!
//! ## Architecture Role
//!
//! ```text
//! ledger feed ──► fold_fund_state ──────► FundState (NAV, share price)
//!             └─► fold_investor_summary ► InvestorSummary
//!             └─► fold_fund_statistics ─► FundStatistics
//! ```
//!
//! Every function is pure; snapshot the ledger, pass it in, discard the
//! result when it is no longer wanted.

pub mod estimate;
pub mod fold;
pub mod ledger;
pub mod valuation;

pub use estimate::{
    estimate_redemption_value, estimate_shares_for_deposit, live_share_estimate, redeem_fraction,
};
pub use fold::{
    check_redeem_admissible, fold_fund_state, fold_fund_statistics, fold_investor_summary,
    position_value, FundState, FundStatistics, InvestorSummary,
};
pub use ledger::{EntryKind, InMemoryLedger, LedgerEntry, LedgerError, LedgerSource};
pub use valuation::{
    nav_in_quote, share_price_change_pct, valuation_history, ExchangeRate, GavPoint, RatePoint,
    ValuationPoint,
};

/// Common types for accounting calculations
pub use rust_decimal::Decimal;
