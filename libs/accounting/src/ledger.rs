//! Ledger entries and the ledger source contract
//!
//! A ledger is the append-only record of deposits and redemptions against a
//! fund. Entries are validated once, on ingestion; the folds in
//! [`crate::fold`] assume validated input and only re-check the share
//! non-negativity invariant.

use crate::estimate::{estimate_redemption_value, estimate_shares_for_deposit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};
use types::{EngineError, FundId, InvestorAddress};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Deposit,
    Redeem,
}

/// One recorded deposit or redeem event
///
/// Field names on the wire follow the investment-record format
/// (`type`, `sharePrice`, `txHash`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub fund_id: FundId,
    pub investor_address: InvestorAddress,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Denomination-asset amount moved
    pub amount: Decimal,
    /// Shares minted (deposit) or burned (redeem)
    pub shares: Decimal,
    #[serde(rename = "sharePrice")]
    pub share_price_at_entry: Decimal,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl LedgerEntry {
    /// Record for a confirmed deposit, shares estimated at `share_price`
    pub fn pending_deposit(
        fund_id: FundId,
        investor_address: InvestorAddress,
        amount: Decimal,
        share_price: Decimal,
        denomination_decimals: u32,
        timestamp: u64,
    ) -> Result<Self, EngineError> {
        let shares = estimate_shares_for_deposit(amount, share_price, denomination_decimals)?;
        Ok(Self {
            fund_id,
            investor_address,
            kind: EntryKind::Deposit,
            amount,
            shares,
            share_price_at_entry: share_price,
            timestamp,
            tx_hash: None,
        })
    }

    /// Record for a confirmed redemption, amount estimated at `share_price`
    pub fn pending_redeem(
        fund_id: FundId,
        investor_address: InvestorAddress,
        shares: Decimal,
        share_price: Decimal,
        timestamp: u64,
    ) -> Result<Self, EngineError> {
        let amount = estimate_redemption_value(shares, share_price)?;
        Ok(Self {
            fund_id,
            investor_address,
            kind: EntryKind::Redeem,
            amount,
            shares,
            share_price_at_entry: share_price,
            timestamp,
            tx_hash: None,
        })
    }

    /// Attach the execution identifier returned by the trade executor
    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    /// Ingestion-time checks: positive amount, shares and price
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.amount <= Decimal::ZERO {
            return Err(EngineError::invalid_input(format!(
                "ledger amount must be positive, got {}",
                self.amount
            )));
        }
        if self.shares <= Decimal::ZERO {
            return Err(EngineError::invalid_input(format!(
                "ledger shares must be positive, got {}",
                self.shares
            )));
        }
        if self.share_price_at_entry <= Decimal::ZERO {
            return Err(EngineError::invalid_input(format!(
                "ledger share price must be positive, got {}",
                self.share_price_at_entry
            )));
        }
        Ok(())
    }

    /// Shares as a signed delta to the outstanding balance
    pub fn signed_shares(&self) -> Decimal {
        match self.kind {
            EntryKind::Deposit => self.shares,
            EntryKind::Redeem => -self.shares,
        }
    }
}

/// Read side of the investment-record store
///
/// Implementations must return entries in timestamp order, ties in
/// insertion order. The folds never sort.
pub trait LedgerSource {
    fn entries_for_fund(&self, fund_id: &FundId) -> anyhow::Result<Vec<LedgerEntry>>;

    fn entries_for_investor(
        &self,
        fund_id: &FundId,
        investor: &InvestorAddress,
    ) -> anyhow::Result<Vec<LedgerEntry>>;
}

/// Reasons an entry is refused at append time
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Rejected entry: {0}")]
    Rejected(#[from] EngineError),

    #[error("Out of order entry for fund {fund}: timestamp {timestamp} precedes {last}")]
    OutOfOrder {
        fund: FundId,
        timestamp: u64,
        last: u64,
    },
}

/// Per-fund append position
#[derive(Debug, Clone, Copy, Default)]
struct FundCursor {
    last_timestamp: u64,
    entry_count: usize,
}

/// Insertion-ordered in-memory ledger
///
/// Enforces every ingestion precondition on append, so anything it hands
/// to the folds is already valid. Share balances are kept per fund and
/// investor, so an append costs the same however long the ledger is.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    entries: Vec<LedgerEntry>,
    funds: HashMap<FundId, FundCursor>,
    balances: HashMap<(FundId, InvestorAddress), Decimal>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger by appending `entries` in order
    pub fn from_entries(
        entries: impl IntoIterator<Item = LedgerEntry>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        for entry in entries {
            ledger.append(entry)?;
        }
        Ok(ledger)
    }

    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        entry.validate()?;

        let cursor = self
            .funds
            .get(&entry.fund_id)
            .copied()
            .unwrap_or_default();
        if cursor.entry_count > 0 && entry.timestamp < cursor.last_timestamp {
            warn!(
                fund = %entry.fund_id,
                timestamp = entry.timestamp,
                last = cursor.last_timestamp,
                "Refusing out-of-order ledger entry"
            );
            return Err(LedgerError::OutOfOrder {
                fund: entry.fund_id.clone(),
                timestamp: entry.timestamp,
                last: cursor.last_timestamp,
            });
        }

        let key = (entry.fund_id.clone(), entry.investor_address.clone());
        let held = self.balances.get(&key).copied().unwrap_or(Decimal::ZERO);
        let balance = match entry.kind {
            EntryKind::Deposit => held
                .checked_add(entry.shares)
                .ok_or_else(|| EngineError::overflow("investor share balance"))?,
            EntryKind::Redeem => {
                if entry.shares > held {
                    return Err(EngineError::NegativeShareBalance {
                        index: cursor.entry_count,
                        outstanding: held,
                        requested: entry.shares,
                    }
                    .into());
                }
                held - entry.shares
            }
        };

        debug!(
            fund = %entry.fund_id,
            investor = %entry.investor_address,
            kind = ?entry.kind,
            shares = %entry.shares,
            "Ledger entry appended"
        );
        self.funds.insert(
            entry.fund_id.clone(),
            FundCursor {
                last_timestamp: entry.timestamp,
                entry_count: cursor.entry_count + 1,
            },
        );
        self.balances.insert(key, balance);
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LedgerSource for InMemoryLedger {
    fn entries_for_fund(&self, fund_id: &FundId) -> anyhow::Result<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| &e.fund_id == fund_id)
            .cloned()
            .collect())
    }

    fn entries_for_investor(
        &self,
        fund_id: &FundId,
        investor: &InvestorAddress,
    ) -> anyhow::Result<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| &e.fund_id == fund_id && &e.investor_address == investor)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(investor: &str, shares: Decimal, timestamp: u64) -> LedgerEntry {
        LedgerEntry {
            fund_id: FundId::new("fund-1"),
            investor_address: InvestorAddress::new(investor),
            kind: EntryKind::Deposit,
            amount: shares,
            shares,
            share_price_at_entry: dec!(1),
            timestamp,
            tx_hash: None,
        }
    }

    fn redeem(investor: &str, shares: Decimal, timestamp: u64) -> LedgerEntry {
        LedgerEntry {
            kind: EntryKind::Redeem,
            ..deposit(investor, shares, timestamp)
        }
    }

    #[test]
    fn test_wire_format_matches_investment_records() {
        let json = r#"{
            "fundId": "fund-1",
            "investorAddress": "0xABC",
            "type": "deposit",
            "amount": "100",
            "shares": "95.238095238095238095",
            "sharePrice": "1.05",
            "timestamp": 1700000000000,
            "txHash": "0xdead"
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Deposit);
        assert_eq!(entry.investor_address.as_str(), "0xabc");
        assert_eq!(entry.share_price_at_entry, dec!(1.05));
        assert_eq!(entry.tx_hash.as_deref(), Some("0xdead"));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "deposit");
        assert_eq!(value["sharePrice"], "1.05");
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let mut entry = deposit("0xa", dec!(10), 1);
        assert!(entry.validate().is_ok());

        entry.amount = dec!(0);
        assert!(matches!(
            entry.validate(),
            Err(EngineError::InvalidQuoteInput { .. })
        ));

        let mut entry = deposit("0xa", dec!(10), 1);
        entry.shares = dec!(-1);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_pending_entries_estimate_from_share_price() {
        let entry = LedgerEntry::pending_deposit(
            FundId::new("fund-1"),
            InvestorAddress::new("0xa"),
            dec!(100),
            dec!(1.25),
            18,
            1,
        )
        .unwrap()
        .with_tx_hash("0xbeef");
        assert_eq!(entry.shares, dec!(80));
        assert_eq!(entry.tx_hash.as_deref(), Some("0xbeef"));

        let entry = LedgerEntry::pending_redeem(
            FundId::new("fund-1"),
            InvestorAddress::new("0xa"),
            dec!(40),
            dec!(1.25),
            2,
        )
        .unwrap();
        assert_eq!(entry.amount, dec!(50));
        assert_eq!(entry.kind, EntryKind::Redeem);
    }

    #[test]
    fn test_append_refuses_out_of_order_entries() {
        let mut ledger = InMemoryLedger::new();
        ledger.append(deposit("0xa", dec!(10), 100)).unwrap();
        // Same timestamp is a tie, kept in insertion order
        ledger.append(deposit("0xb", dec!(5), 100)).unwrap();

        let err = ledger.append(deposit("0xa", dec!(1), 99)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::OutOfOrder {
                fund: FundId::new("fund-1"),
                timestamp: 99,
                last: 100,
            }
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_append_refuses_over_redeem_per_investor() {
        let mut ledger = InMemoryLedger::new();
        ledger.append(deposit("0xa", dec!(10), 1)).unwrap();
        ledger.append(deposit("0xb", dec!(50), 2)).unwrap();

        // Fund holds 60 shares but 0xa only owns 10
        let err = ledger.append(redeem("0xa", dec!(20), 3)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rejected(EngineError::NegativeShareBalance { .. })
        ));

        ledger.append(redeem("0xa", dec!(10), 4)).unwrap();
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_balances_are_tracked_per_fund_and_investor() {
        let mut other_fund = deposit("0xa", dec!(100), 2);
        other_fund.fund_id = FundId::new("fund-2");

        let mut ledger = InMemoryLedger::from_entries(vec![
            deposit("0xa", dec!(5), 1),
            other_fund,
            deposit("0xb", dec!(8), 3),
        ])
        .unwrap();

        // fund-2 shares do not count toward fund-1
        let err = ledger.append(redeem("0xa", dec!(6), 4)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Rejected(EngineError::NegativeShareBalance {
                index: 2,
                outstanding: dec!(5),
                requested: dec!(6),
            })
        );

        ledger.append(redeem("0xA", dec!(2), 4)).unwrap();
        ledger.append(redeem("0xa", dec!(3), 5)).unwrap();
        assert!(ledger.append(redeem("0xa", dec!(0.000000000000000001), 6)).is_err());
        ledger.append(redeem("0xb", dec!(8), 6)).unwrap();
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn test_long_ledger_reports_fund_position_on_over_redeem() {
        let entries = (0..20_000u64).map(|i| {
            if i % 2 == 0 {
                deposit("0xa", dec!(1), i)
            } else {
                redeem("0xa", dec!(1), i)
            }
        });
        let mut ledger = InMemoryLedger::from_entries(entries).unwrap();
        assert_eq!(ledger.len(), 20_000);

        let err = ledger.append(redeem("0xa", dec!(1), 20_000)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Rejected(EngineError::NegativeShareBalance {
                index: 20_000,
                outstanding: dec!(0),
                requested: dec!(1),
            })
        );
    }

    #[test]
    fn test_source_filters_preserve_order() {
        let mut other_fund = deposit("0xa", dec!(7), 1);
        other_fund.fund_id = FundId::new("fund-2");

        let ledger = InMemoryLedger::from_entries(vec![
            deposit("0xa", dec!(1), 1),
            other_fund,
            deposit("0xb", dec!(2), 2),
            deposit("0xa", dec!(3), 3),
        ])
        .unwrap();

        let fund = FundId::new("fund-1");
        let all = ledger.entries_for_fund(&fund).unwrap();
        assert_eq!(
            all.iter().map(|e| e.shares).collect::<Vec<_>>(),
            vec![dec!(1), dec!(2), dec!(3)]
        );

        let mine = ledger
            .entries_for_investor(&fund, &InvestorAddress::new("0xA"))
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[1].shares, dec!(3));
    }
}
