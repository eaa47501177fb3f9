//! File-backed ledger and reserve sources

use accounting::{InMemoryLedger, LedgerEntry};
use amm::StaticReserves;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a JSON array of ledger entries, validating each on append
pub fn load_ledger(path: &Path) -> Result<InMemoryLedger> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ledger file {:?}", path))?;
    let entries: Vec<LedgerEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse ledger file {:?}", path))?;

    let count = entries.len();
    let ledger = InMemoryLedger::from_entries(entries)
        .with_context(|| format!("Ledger file {:?} failed validation", path))?;
    info!(?path, entries = count, "Ledger loaded");
    Ok(ledger)
}

/// Read a JSON object of pool id to `{ reserveA, reserveB }`
pub fn load_pools(path: &Path) -> Result<StaticReserves> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool snapshot file {:?}", path))?;
    let pools: StaticReserves = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse pool snapshot file {:?}", path))?;
    info!(?path, "Pool snapshot loaded");
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounting::LedgerSource;
    use amm::{PoolState, ReserveSource};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;
    use types::{FundId, InvestorAddress, PoolId};

    const LEDGER: &str = r#"[
        {"fundId": "fund-1", "investorAddress": "0xABC", "type": "deposit",
         "amount": "100", "shares": "100", "sharePrice": "1", "timestamp": 1},
        {"fundId": "fund-1", "investorAddress": "0xabc", "type": "redeem",
         "amount": 44, "shares": 40, "sharePrice": "1.1", "timestamp": 2,
         "txHash": "0xdead"}
    ]"#;

    #[test]
    fn test_load_ledger_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, LEDGER).unwrap();

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.len(), 2);

        let entries = ledger
            .entries_for_investor(&FundId::new("fund-1"), &InvestorAddress::new("0xAbC"))
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].tx_hash.as_deref(), Some("0xdead"));
        assert_eq!(entries[1].share_price_at_entry, dec!(1.1));
    }

    #[test]
    fn test_load_ledger_rejects_over_redeem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(
            &path,
            r#"[{"fundId": "f", "investorAddress": "0x1", "type": "redeem",
                 "amount": "1", "shares": "1", "sharePrice": "1", "timestamp": 1}]"#,
        )
        .unwrap();

        assert!(load_ledger(&path).is_err());
        assert!(load_ledger(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_load_pools_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pools.json");
        fs::write(
            &path,
            r#"{"fund-pool": {"reserveA": "40000", "reserveB": "0.04"}}"#,
        )
        .unwrap();

        let pools = load_pools(&path).unwrap();
        assert_eq!(
            pools.reserves(&PoolId::new("fund-pool")).unwrap(),
            PoolState::new(dec!(40000), dec!(0.04))
        );
    }
}
