//! Engine Configuration Module
//!
//! Loads the accounting and quote parameters from layered sources:
//! built-in defaults, a TOML file, an optional environment-specific TOML
//! file, then `FUNDLINE_*` environment variables
//! (e.g. `FUNDLINE_AMM__DEFAULT_SLIPPAGE_BPS=50`).

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Fund accounting parameters
    pub accounting: AccountingSettings,

    /// AMM quote parameters
    pub amm: AmmSettings,

    /// Log output settings
    pub logging: LoggingSettings,

    /// Snapshot file locations
    pub data: DataSettings,
}

/// Fund accounting parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AccountingSettings {
    /// Share price used while a fund's ledger is empty
    pub default_share_price: Decimal,
    /// Decimals of the fund's denomination asset
    pub denomination_decimals: u32,
}

/// AMM quote parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AmmSettings {
    /// Fraction of the output reserve a single quote may not reach
    pub max_drain_fraction: Decimal,
    /// Slippage tolerance used when the caller supplies none
    pub default_slippage_bps: u32,
    /// Quotes older than this must be re-derived from fresh reserves
    pub quote_refresh_interval_ms: u64,
    /// Decimals of the output token; minimum outputs are truncated to them
    pub output_decimals: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

/// Locations of the ledger and pool snapshots read by the desk binary
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub ledger_path: Option<PathBuf>,
    pub pool_snapshot_path: Option<PathBuf>,
}

impl Default for AccountingSettings {
    fn default() -> Self {
        Self {
            default_share_price: defaults::accounting::DEFAULT_SHARE_PRICE,
            denomination_decimals: defaults::accounting::DENOMINATION_DECIMALS,
        }
    }
}

impl Default for AmmSettings {
    fn default() -> Self {
        Self {
            max_drain_fraction: defaults::amm::MAX_DRAIN_FRACTION,
            default_slippage_bps: defaults::amm::DEFAULT_SLIPPAGE_BPS,
            quote_refresh_interval_ms: defaults::amm::QUOTE_REFRESH_INTERVAL_MS,
            output_decimals: defaults::amm::OUTPUT_DECIMALS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl EngineConfig {
    /// Load configuration from files with environment overrides
    ///
    /// A missing base file is not an error when `base_path` is `None`: the
    /// built-in defaults apply. An explicitly named file must exist.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(defaults::paths::CONFIG_FILE), false),
        };

        let defaults = Config::try_from(&EngineConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(base.as_path()).required(required));

        // Environment overrides live next to the base file
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(defaults::paths::ENVIRONMENTS_DIR)
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (FUNDLINE_ prefix)
        builder = builder.add_source(
            Environment::with_prefix(defaults::paths::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: EngineConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.accounting.default_share_price <= Decimal::ZERO {
            bail!(
                "accounting.default_share_price must be positive, got {}",
                self.accounting.default_share_price
            );
        }
        if self.accounting.denomination_decimals > 28 {
            bail!(
                "accounting.denomination_decimals must be at most 28, got {}",
                self.accounting.denomination_decimals
            );
        }
        if self.amm.max_drain_fraction <= Decimal::ZERO || self.amm.max_drain_fraction > Decimal::ONE
        {
            bail!(
                "amm.max_drain_fraction must be in (0, 1], got {}",
                self.amm.max_drain_fraction
            );
        }
        if self.amm.default_slippage_bps > 10_000 {
            bail!(
                "amm.default_slippage_bps must be at most 10000, got {}",
                self.amm.default_slippage_bps
            );
        }
        if self.amm.output_decimals > 28 {
            bail!(
                "amm.output_decimals must be at most 28, got {}",
                self.amm.output_decimals
            );
        }
        if self.amm.quote_refresh_interval_ms == 0 {
            bail!("amm.quote_refresh_interval_ms must be positive");
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            bail!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS,
                self.logging.level
            );
        }
        Ok(())
    }

    /// Expand environment variables in data paths
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.data.ledger_path {
            let expanded = shellexpand::env(&path.to_string_lossy())
                .context("Failed to expand ledger path")?
                .into_owned();
            self.data.ledger_path = Some(PathBuf::from(expanded));
        }

        if let Some(path) = &self.data.pool_snapshot_path {
            let expanded = shellexpand::env(&path.to_string_lossy())
                .context("Failed to expand pool snapshot path")?
                .into_owned();
            self.data.pool_snapshot_path = Some(PathBuf::from(expanded));
        }

        Ok(())
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(path, environment)?;
    config.expand_env_vars()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        // Explicit path must exist
        assert!(EngineConfig::load(Some(&missing), None).is_err());

        let config = EngineConfig::default();
        assert_eq!(config.accounting.default_share_price, dec!(1));
        assert_eq!(config.amm.max_drain_fraction, dec!(0.99));
        assert_eq!(config.amm.default_slippage_bps, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_base_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("fundline.toml");

        let config_content = r#"
[accounting]
default_share_price = "1.05"
denomination_decimals = 6

[amm]
max_drain_fraction = "0.95"
default_slippage_bps = 50

[logging]
level = "debug"

[data]
ledger_path = "/tmp/ledger.json"
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = EngineConfig::load(Some(&config_path), None).unwrap();

        assert_eq!(config.accounting.default_share_price, dec!(1.05));
        assert_eq!(config.accounting.denomination_decimals, 6);
        assert_eq!(config.amm.max_drain_fraction, dec!(0.95));
        assert_eq!(config.amm.default_slippage_bps, 50);
        // Unset keys keep their defaults
        assert_eq!(config.amm.quote_refresh_interval_ms, 10_000);
        assert_eq!(config.amm.output_decimals, 18);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.data.ledger_path,
            Some(PathBuf::from("/tmp/ledger.json"))
        );
    }

    #[test]
    fn test_environment_override_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("fundline.toml");
        fs::write(&config_path, "[amm]\ndefault_slippage_bps = 100\n").unwrap();

        let env_dir = dir.path().join("environments");
        fs::create_dir(&env_dir).unwrap();
        fs::write(
            env_dir.join("staging.toml"),
            "[amm]\ndefault_slippage_bps = 300\n",
        )
        .unwrap();

        let base = EngineConfig::load(Some(&config_path), None).unwrap();
        assert_eq!(base.amm.default_slippage_bps, 100);

        let staging = EngineConfig::load(Some(&config_path), Some("staging")).unwrap();
        assert_eq!(staging.amm.default_slippage_bps, 300);

        // Unknown environments fall back to the base file
        let prod = EngineConfig::load(Some(&config_path), Some("production")).unwrap();
        assert_eq!(prod.amm.default_slippage_bps, 100);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.amm.max_drain_fraction = dec!(1.5);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.amm.default_slippage_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.accounting.default_share_price = dec!(0);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_is_rejected_at_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("fundline.toml");
        fs::write(&config_path, "[amm]\ndefault_slippage_bps = 20000\n").unwrap();

        assert!(EngineConfig::load(Some(&config_path), None).is_err());
    }

    #[test]
    fn test_toml_rendering_round_trips() {
        let config = EngineConfig::default();
        let rendered = config.to_toml().unwrap();

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("fundline.toml");
        fs::write(&config_path, rendered).unwrap();

        let loaded = EngineConfig::load(Some(&config_path), None).unwrap();
        assert_eq!(loaded, config);
    }
}
