//! Backtest configuration.
//!
//! Configurations can be built in code or loaded from TOML files for
//! reproducible runs. Validation happens before the pipeline executes.

use crate::error::{Result, SigevalError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Position neutralization policy.
///
/// Only dollar-neutral long/short ("all") is implemented; the enum exists so
/// other policies fail at the configuration boundary instead of deep in the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Neutralization {
    /// Full long/short dollar neutralization: each book is scaled to the
    /// investment budget, so aggregate exposure nets to zero.
    #[default]
    All,
}

impl FromStr for Neutralization {
    type Err = SigevalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Neutralization::All),
            other => Err(SigevalError::Config(format!(
                "unsupported neutralization mode: {other:?} (supported: \"all\")"
            ))),
        }
    }
}

impl std::fmt::Display for Neutralization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Neutralization::All => write!(f, "all"),
        }
    }
}

/// Configuration for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Instrument universe (ticker symbols).
    pub universe: Vec<String>,
    /// First date of the historical window (inclusive).
    pub start: NaiveDate,
    /// Last date of the historical window (inclusive).
    pub end: NaiveDate,
    /// Neutralization policy.
    #[serde(default)]
    pub neutralization: Neutralization,
    /// Gross investment budget per book, in dollars.
    #[serde(default = "default_investment")]
    pub investment: f64,
}

fn default_investment() -> f64 { 50_000.0 }

impl BacktestConfig {
    /// Create a configuration with the default neutralization policy.
    pub fn new(universe: Vec<String>, start: NaiveDate, end: NaiveDate, investment: f64) -> Self {
        Self {
            universe,
            start,
            end,
            neutralization: Neutralization::default(),
            investment,
        }
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        info!(
            "Loaded backtest configuration from {}: {} instruments, {} to {}",
            path.display(),
            config.universe.len(),
            config.start,
            config.end
        );
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.universe.is_empty() {
            return Err(SigevalError::Config("universe is empty".to_string()));
        }
        if self.start > self.end {
            return Err(SigevalError::Config(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        if !self.investment.is_finite() || self.investment <= 0.0 {
            return Err(SigevalError::Config(format!(
                "investment must be a positive amount, got {}",
                self.investment
            )));
        }
        Ok(())
    }
}
