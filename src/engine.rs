//! Pipeline orchestration.
//!
//! Runs the stages in order on a single panel: signal, positions, pnl,
//! incomplete-row cleanup, annual metrics. The panel flows through the stages
//! linearly and is consumed by the run.

use crate::config::BacktestConfig;
use crate::data::DataSource;
use crate::error::{Result, SigevalError};
use crate::metrics::{annual_metrics, YearMetrics};
use crate::pnl::{compute_pnl, drop_incomplete};
use crate::position::generate_positions;
use crate::signal::{attach_signal, SignalFunction};
use crate::types::Panel;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Results of one backtest run: one metrics row per calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Name of the evaluated signal.
    pub signal_name: String,
    /// Configuration used.
    pub config: BacktestConfig,
    /// Number of fully derived (date, instrument) observations.
    pub observations: usize,
    /// Annual metrics, in ascending year order.
    pub years: Vec<YearMetrics>,
}

/// Signal evaluation engine.
///
/// Holds a validated configuration and runs the pipeline against panels.
pub struct Engine {
    config: BacktestConfig,
}

impl Engine {
    /// Create an engine, validating the configuration up front.
    pub fn new(config: BacktestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Fetch the configured universe from a data source and evaluate a signal.
    pub fn run_with_source(
        &self,
        signal: &dyn SignalFunction,
        source: &dyn DataSource,
    ) -> Result<BacktestResult> {
        let panel = source.fetch(&self.config.universe, self.config.start, self.config.end)?;
        self.run(signal, panel)
    }

    /// Evaluate a signal against an already loaded panel.
    pub fn run(&self, signal: &dyn SignalFunction, mut panel: Panel) -> Result<BacktestResult> {
        if panel.is_empty() {
            return Err(SigevalError::NoData);
        }

        info!(
            "Evaluating signal {:?} on {} rows, investment {}",
            signal.name(),
            panel.len(),
            self.config.investment
        );

        attach_signal(&mut panel, signal)?;
        generate_positions(&mut panel, self.config.investment, self.config.neutralization);
        compute_pnl(&mut panel);
        drop_incomplete(&mut panel);

        let years = annual_metrics(&panel, self.config.investment);
        info!(
            "Signal {:?}: {} observations across {} years",
            signal.name(),
            panel.len(),
            years.len()
        );

        Ok(BacktestResult {
            signal_name: signal.name().to_string(),
            config: self.config.clone(),
            observations: panel.len(),
            years,
        })
    }
}
