//! Fundline Fund Desk
//!
//! Reads a ledger snapshot and a pool-reserve snapshot from JSON files and
//! runs the accounting and quote engines over them. Results go to stdout as
//! pretty JSON; logs go to stderr.
//!
//! Architecture:
//! ledger.json → InMemoryLedger → accounting folds/estimates ┐
//! pools.json  → StaticReserves → QuoteEngine                ┴→ stdout

mod commands;
mod sources;

use amm::SwapDirection;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::{load_config, EngineConfig};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use types::{parse_decimal, FundId, InvestorAddress, PoolId};

use commands::RateArg;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fund_desk")]
#[command(about = "Fund NAV, share estimates and swap quotes from ledger and pool snapshots")]
struct Args {
    /// Configuration file path (defaults to config/fundline.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment (development, staging, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Ledger file, overriding data.ledger_path
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Pool snapshot file, overriding data.pool_snapshot_path
    #[arg(long)]
    pools: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Outstanding shares, NAV and share price of a fund
    Nav {
        #[arg(long)]
        fund: String,
        /// Denomination-to-quote rate for a NAV in another currency
        #[arg(long, value_parser = decimal_arg)]
        rate: Option<Decimal>,
        #[arg(long, default_value = "WETH")]
        base: String,
        #[arg(long, default_value = "USD")]
        quote: String,
    },
    /// One investor's position in a fund
    Investor {
        #[arg(long)]
        fund: String,
        #[arg(long)]
        investor: String,
        /// Also report this fraction of the position in basis points
        #[arg(long)]
        fraction_bps: Option<u32>,
    },
    /// Deposit and redeem flow totals of a fund
    Stats {
        #[arg(long)]
        fund: String,
    },
    /// Shares a deposit would mint
    EstimateDeposit {
        #[arg(long)]
        fund: String,
        #[arg(long, value_parser = decimal_arg)]
        amount: Decimal,
        /// Price to estimate at instead of the fund's current one
        #[arg(long, value_parser = decimal_arg)]
        share_price: Option<Decimal>,
    },
    /// Denomination amount a redemption would pay
    EstimateRedeem {
        #[arg(long)]
        fund: String,
        #[arg(long, value_parser = decimal_arg)]
        shares: Decimal,
        #[arg(long, value_parser = decimal_arg)]
        share_price: Option<Decimal>,
    },
    /// Swap quote against a pool snapshot
    Quote {
        #[arg(long)]
        pool: String,
        #[arg(long, value_parser = decimal_arg)]
        amount: Decimal,
        /// a_to_b or b_to_a
        #[arg(long, default_value = "a_to_b")]
        direction: SwapDirection,
        /// Slippage tolerance; the configured default when omitted
        #[arg(long)]
        slippage_bps: Option<u32>,
    },
}

fn decimal_arg(input: &str) -> Result<Decimal, String> {
    parse_decimal(input).map_err(|e| e.to_string())
}

fn init_tracing(config: &EngineConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn ledger_path(args: &Args, config: &EngineConfig) -> Result<PathBuf> {
    args.ledger
        .clone()
        .or_else(|| config.data.ledger_path.clone())
        .ok_or_else(|| anyhow!("No ledger file: pass --ledger or set data.ledger_path"))
}

fn pools_path(args: &Args, config: &EngineConfig) -> Result<PathBuf> {
    args.pools
        .clone()
        .or_else(|| config.data.pool_snapshot_path.clone())
        .ok_or_else(|| anyhow!("No pool snapshot file: pass --pools or set data.pool_snapshot_path"))
}

fn run(args: &Args, config: &EngineConfig) -> Result<serde_json::Value> {
    match &args.command {
        Command::Nav {
            fund,
            rate,
            base,
            quote,
        } => {
            let ledger = sources::load_ledger(&ledger_path(args, config)?)?;
            let rate = rate.map(|rate| RateArg {
                base: base.clone(),
                quote: quote.clone(),
                rate,
            });
            commands::nav(&ledger, config, &FundId::new(fund.as_str()), rate)
        }
        Command::Investor {
            fund,
            investor,
            fraction_bps,
        } => {
            let ledger = sources::load_ledger(&ledger_path(args, config)?)?;
            commands::investor(
                &ledger,
                config,
                &FundId::new(fund.as_str()),
                &InvestorAddress::new(investor.as_str()),
                *fraction_bps,
            )
        }
        Command::Stats { fund } => {
            let ledger = sources::load_ledger(&ledger_path(args, config)?)?;
            commands::stats(&ledger, &FundId::new(fund.as_str()))
        }
        Command::EstimateDeposit {
            fund,
            amount,
            share_price,
        } => {
            let ledger = sources::load_ledger(&ledger_path(args, config)?)?;
            commands::estimate_deposit(
                &ledger,
                config,
                &FundId::new(fund.as_str()),
                *amount,
                *share_price,
            )
        }
        Command::EstimateRedeem {
            fund,
            shares,
            share_price,
        } => {
            let ledger = sources::load_ledger(&ledger_path(args, config)?)?;
            commands::estimate_redeem(
                &ledger,
                config,
                &FundId::new(fund.as_str()),
                *shares,
                *share_price,
            )
        }
        Command::Quote {
            pool,
            amount,
            direction,
            slippage_bps,
        } => {
            let pools = sources::load_pools(&pools_path(args, config)?)?;
            commands::quote(
                &pools,
                config,
                &PoolId::new(pool.as_str()),
                *amount,
                *direction,
                *slippage_bps,
            )
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.environment.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config);
    info!(
        config = ?args.config,
        environment = args.environment.as_deref().unwrap_or("default"),
        "Fund desk starting"
    );
    debug!(command = ?args.command, "Running command");

    let output = run(&args, &config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render output")?
    );
    Ok(())
}
