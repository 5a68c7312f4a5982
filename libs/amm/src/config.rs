//! Pool and simulator configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `AMM_`-prefixed environment variables (`AMM_POOL__CURVE=constant_product`,
//! `AMM_POOL__FEES__FEE_RATIO=3000000000000000`).

use crate::curve::CurveKind;
use crate::fees::FeeSchedule;
use crate::pool::DepositPolicy;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "AMM";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Behaviour switches applied to a new pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub curve: CurveKind,
    pub deposit_policy: DepositPolicy,
    pub fees: FeeSchedule,
}

/// Top-level settings for the `amm-sim` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmSettings {
    pub log_level: String,
    pub pool: PoolConfig,
}

impl Default for AmmSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl AmmSettings {
    /// Load settings from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text, ignoring the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .context("Failed to parse TOML configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!(
                "Invalid log level '{}' (expected one of {:?})",
                self.log_level,
                LOG_LEVELS
            );
        }
        self.pool
            .fees
            .validate()
            .context("Invalid fee schedule")?;
        Ok(())
    }
}
