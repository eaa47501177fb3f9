//! Ledger folds: fund state, investor summaries and fund statistics
//!
//! Every function here is a pure fold over an ordered slice. Nothing is
//! cached between calls, so a fold can be re-run from scratch at any time
//! and two runs over the same slice are identical.

use crate::ledger::{EntryKind, LedgerEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{EngineError, InvestorAddress};

/// Fund-level state derived from a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundState {
    pub outstanding_shares: Decimal,
    /// `outstanding_shares * share_price`
    pub nav_denomination: Decimal,
    /// Price recorded on the last entry, or the caller's default
    pub share_price: Decimal,
    pub entry_count: usize,
    pub last_timestamp: Option<u64>,
}

/// One investor's position in a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorSummary {
    pub investor: InvestorAddress,
    pub total_deposited: Decimal,
    pub total_redeemed: Decimal,
    pub current_shares: Decimal,
    pub entry_count: usize,
}

/// Fund-wide flow statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundStatistics {
    pub total_deposited: Decimal,
    pub total_redeemed: Decimal,
    pub deposit_count: usize,
    pub redeem_count: usize,
    pub entry_count: usize,
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
}

impl FundStatistics {
    /// Deposits minus redemptions
    pub fn net_flow(&self) -> Decimal {
        self.total_deposited - self.total_redeemed
    }
}

/// Running share balance with the non-negativity check
#[derive(Debug, Default)]
struct ShareBalance {
    outstanding: Decimal,
}

impl ShareBalance {
    fn apply(&mut self, index: usize, entry: &LedgerEntry) -> Result<(), EngineError> {
        self.outstanding = match entry.kind {
            EntryKind::Deposit => self
                .outstanding
                .checked_add(entry.shares)
                .ok_or_else(|| EngineError::overflow("share balance"))?,
            EntryKind::Redeem => {
                let next = self
                    .outstanding
                    .checked_sub(entry.shares)
                    .ok_or_else(|| EngineError::overflow("share balance"))?;
                if next < Decimal::ZERO {
                    return Err(EngineError::NegativeShareBalance {
                        index,
                        outstanding: self.outstanding,
                        requested: entry.shares,
                    });
                }
                next
            }
        };
        Ok(())
    }
}

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal, EngineError> {
    total
        .checked_add(amount)
        .ok_or_else(|| EngineError::overflow("ledger amount total"))
}

/// Fold a single fund's ordered entries into its current state
///
/// `default_share_price` is reported while the ledger is empty. Fails with
/// [`EngineError::NegativeShareBalance`] at the first entry whose redeem
/// would drive outstanding shares below zero.
pub fn fold_fund_state(
    entries: &[LedgerEntry],
    default_share_price: Decimal,
) -> Result<FundState, EngineError> {
    let mut balance = ShareBalance::default();
    for (index, entry) in entries.iter().enumerate() {
        balance.apply(index, entry)?;
    }

    let share_price = entries
        .last()
        .map(|e| e.share_price_at_entry)
        .unwrap_or(default_share_price);

    let nav_denomination = balance
        .outstanding
        .checked_mul(share_price)
        .ok_or_else(|| EngineError::overflow("net asset value"))?;

    let state = FundState {
        outstanding_shares: balance.outstanding,
        nav_denomination,
        share_price,
        entry_count: entries.len(),
        last_timestamp: entries.last().map(|e| e.timestamp),
    };

    debug!(
        outstanding = %state.outstanding_shares,
        nav = %state.nav_denomination,
        share_price = %state.share_price,
        entries = state.entry_count,
        "Folded fund state"
    );
    Ok(state)
}

/// Fold one investor's slice of a fund ledger
///
/// Entries belonging to other investors are skipped; indices in a
/// [`EngineError::NegativeShareBalance`] refer to positions in `entries`.
pub fn fold_investor_summary(
    entries: &[LedgerEntry],
    investor: &InvestorAddress,
) -> Result<InvestorSummary, EngineError> {
    let mut balance = ShareBalance::default();
    let mut total_deposited = Decimal::ZERO;
    let mut total_redeemed = Decimal::ZERO;
    let mut entry_count = 0;

    for (index, entry) in entries.iter().enumerate() {
        if &entry.investor_address != investor {
            continue;
        }
        balance.apply(index, entry)?;
        match entry.kind {
            EntryKind::Deposit => total_deposited = checked_sum(total_deposited, entry.amount)?,
            EntryKind::Redeem => total_redeemed = checked_sum(total_redeemed, entry.amount)?,
        }
        entry_count += 1;
    }

    Ok(InvestorSummary {
        investor: investor.clone(),
        total_deposited,
        total_redeemed,
        current_shares: balance.outstanding,
        entry_count,
    })
}

/// Cumulative subscriptions, redemptions and record counts for a fund
pub fn fold_fund_statistics(entries: &[LedgerEntry]) -> Result<FundStatistics, EngineError> {
    let mut stats = FundStatistics {
        first_timestamp: entries.first().map(|e| e.timestamp),
        last_timestamp: entries.last().map(|e| e.timestamp),
        entry_count: entries.len(),
        ..FundStatistics::default()
    };

    for entry in entries {
        match entry.kind {
            EntryKind::Deposit => {
                stats.total_deposited = checked_sum(stats.total_deposited, entry.amount)?;
                stats.deposit_count += 1;
            }
            EntryKind::Redeem => {
                stats.total_redeemed = checked_sum(stats.total_redeemed, entry.amount)?;
                stats.redeem_count += 1;
            }
        }
    }

    Ok(stats)
}

/// Precondition for admitting a redeem of `shares` by `investor`
///
/// `entries` is the fund's current ledger. Fails with
/// [`EngineError::NegativeShareBalance`] (index = `entries.len()`, the slot
/// the redeem would occupy) when the investor holds fewer shares.
pub fn check_redeem_admissible(
    entries: &[LedgerEntry],
    investor: &InvestorAddress,
    shares: Decimal,
) -> Result<(), EngineError> {
    if shares <= Decimal::ZERO {
        return Err(EngineError::invalid_input(format!(
            "redeem shares must be positive, got {}",
            shares
        )));
    }

    let summary = fold_investor_summary(entries, investor)?;
    if shares > summary.current_shares {
        return Err(EngineError::NegativeShareBalance {
            index: entries.len(),
            outstanding: summary.current_shares,
            requested: shares,
        });
    }
    Ok(())
}

/// Current holding valued in the denomination asset
pub fn position_value(
    summary: &InvestorSummary,
    share_price: Decimal,
) -> Result<Decimal, EngineError> {
    summary
        .current_shares
        .checked_mul(share_price)
        .ok_or_else(|| EngineError::overflow("position value"))
}
