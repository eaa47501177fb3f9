//! Default values for the engine configuration
//!
//! The drain threshold and default slippage are empirically chosen values
//! from the manager trading panel; every one of them can be overridden.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fund accounting defaults
pub mod accounting {
    use super::*;

    /// Share price reported for a fund whose ledger is still empty
    pub const DEFAULT_SHARE_PRICE: Decimal = dec!(1);

    /// Denomination asset decimals (WETH-style 18 decimal tokens)
    pub const DENOMINATION_DECIMALS: u32 = 18;
}

/// AMM quote defaults
pub mod amm {
    use super::*;

    /// Reject quotes whose output reaches this fraction of the output reserve
    pub const MAX_DRAIN_FRACTION: Decimal = dec!(0.99);

    /// Slippage applied when the caller does not choose one (2%)
    pub const DEFAULT_SLIPPAGE_BPS: u32 = 200;

    /// Age after which a quote must be re-derived from fresh reserves
    pub const QUOTE_REFRESH_INTERVAL_MS: u64 = 10_000;

    /// Decimals of the output token when none is configured
    pub const OUTPUT_DECIMALS: u32 = 18;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";
}

/// File locations used by the desk binary
pub mod paths {
    pub const CONFIG_FILE: &str = "config/fundline.toml";
    pub const ENVIRONMENTS_DIR: &str = "environments";

    /// Environment variable prefix for overrides
    pub const ENV_PREFIX: &str = "FUNDLINE";
}
