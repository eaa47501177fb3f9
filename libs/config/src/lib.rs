//! # Fundline Configuration
//!
//! Centralized configuration and defaults for the accounting and quote
//! engines, eliminating magic numbers across the workspace.
//!
//! ## Features
//!
//! - **Defaults**: Share price fallback, drain threshold, default slippage
//! - **Layered Loading**: TOML file, per-environment file, `FUNDLINE_*` variables
//! - **Validation**: Out-of-range values fail at load, not at quote time
//!
//! ## Usage
//!
//! ```rust,no_run
//! use config::load_config;
//!
//! let config = load_config(None, Some("staging")).unwrap();
//! let slippage = config.amm.default_slippage_bps;
//! ```

pub mod defaults;
pub mod engine_config;

// Re-export commonly used types
pub use engine_config::{
    load_config, AccountingSettings, AmmSettings, DataSettings, EngineConfig, LoggingSettings,
};
