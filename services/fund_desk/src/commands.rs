//! Subcommand handlers
//!
//! Each handler reads from the sources it is given and returns a JSON value;
//! printing is left to `main`.

use accounting::{
    estimate_redemption_value, estimate_shares_for_deposit, fold_fund_state,
    fold_fund_statistics, fold_investor_summary, nav_in_quote, position_value, redeem_fraction,
    ExchangeRate, LedgerSource,
};
use amm::{QuoteEngine, QuoteParams, ReserveSource, SwapDirection};
use anyhow::{Context, Result};
use config::EngineConfig;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use types::{FundId, InvestorAddress, PoolId};

/// Quote in another currency, e.g. `--rate 3200 --base WETH --quote USD`
#[derive(Debug, Clone)]
pub struct RateArg {
    pub base: String,
    pub quote: String,
    pub rate: Decimal,
}

pub fn nav(
    ledger: &impl LedgerSource,
    config: &EngineConfig,
    fund: &FundId,
    rate: Option<RateArg>,
) -> Result<Value> {
    let entries = ledger.entries_for_fund(fund)?;
    let state = fold_fund_state(&entries, config.accounting.default_share_price)
        .with_context(|| format!("Failed to fold ledger for fund {}", fund))?;

    let mut out = json!({ "fund": fund, "state": state });
    if let Some(rate) = rate {
        let rate = ExchangeRate::new(rate.base, rate.quote, rate.rate)?;
        out["navInQuote"] = json!({
            "currency": rate.quote,
            "value": nav_in_quote(&state, &rate)?,
        });
    }
    Ok(out)
}

pub fn investor(
    ledger: &impl LedgerSource,
    config: &EngineConfig,
    fund: &FundId,
    investor: &InvestorAddress,
    fraction_bps: Option<u32>,
) -> Result<Value> {
    let fund_entries = ledger.entries_for_fund(fund)?;
    let state = fold_fund_state(&fund_entries, config.accounting.default_share_price)?;

    let entries = ledger.entries_for_investor(fund, investor)?;
    let summary = fold_investor_summary(&entries, investor)
        .with_context(|| format!("Failed to fold ledger for investor {}", investor))?;
    let value = position_value(&summary, state.share_price)?;

    let mut out = json!({
        "fund": fund,
        "summary": summary,
        "sharePrice": state.share_price,
        "positionValue": value,
    });
    if let Some(bps) = fraction_bps {
        out["redeemShares"] = json!(redeem_fraction(summary.current_shares, bps)?);
    }
    Ok(out)
}

pub fn stats(ledger: &impl LedgerSource, fund: &FundId) -> Result<Value> {
    let entries = ledger.entries_for_fund(fund)?;
    let stats = fold_fund_statistics(&entries)?;
    Ok(json!({
        "fund": fund,
        "statistics": stats,
        "netFlow": stats.net_flow(),
    }))
}

/// Share price to estimate at: explicit override, else the fund's current
fn effective_share_price(
    ledger: &impl LedgerSource,
    config: &EngineConfig,
    fund: &FundId,
    override_price: Option<Decimal>,
) -> Result<Decimal> {
    match override_price {
        Some(price) => Ok(price),
        None => {
            let entries = ledger.entries_for_fund(fund)?;
            Ok(fold_fund_state(&entries, config.accounting.default_share_price)?.share_price)
        }
    }
}

pub fn estimate_deposit(
    ledger: &impl LedgerSource,
    config: &EngineConfig,
    fund: &FundId,
    amount: Decimal,
    share_price: Option<Decimal>,
) -> Result<Value> {
    let price = effective_share_price(ledger, config, fund, share_price)?;
    let shares =
        estimate_shares_for_deposit(amount, price, config.accounting.denomination_decimals)?;
    Ok(json!({
        "fund": fund,
        "amount": amount,
        "sharePrice": price,
        "shares": shares,
    }))
}

pub fn estimate_redeem(
    ledger: &impl LedgerSource,
    config: &EngineConfig,
    fund: &FundId,
    shares: Decimal,
    share_price: Option<Decimal>,
) -> Result<Value> {
    let price = effective_share_price(ledger, config, fund, share_price)?;
    let amount = estimate_redemption_value(shares, price)?;
    Ok(json!({
        "fund": fund,
        "shares": shares,
        "sharePrice": price,
        "amount": amount,
    }))
}

pub fn quote(
    pools: &impl ReserveSource,
    config: &EngineConfig,
    pool: &PoolId,
    amount_in: Decimal,
    direction: SwapDirection,
    slippage_bps: Option<u32>,
) -> Result<Value> {
    let params = QuoteParams::new(
        config.amm.max_drain_fraction,
        config.amm.default_slippage_bps,
        config.amm.output_decimals,
    )?;
    let engine = QuoteEngine::new(params);

    let state = pools.reserves(pool)?;
    let quote = match slippage_bps {
        Some(bps) => engine.quote(&state, amount_in, direction, bps)?,
        None => engine.quote_default_slippage(&state, amount_in, direction)?,
    };
    Ok(json!({
        "pool": pool,
        "reserves": state,
        "spotRate": state.spot_rate(direction)?,
        "quote": quote,
    }))
}
