//! Sigeval - single-signal equity backtesting and performance evaluation.
//!
//! # Overview
//!
//! Sigeval evaluates one trading signal against one instrument universe over
//! one historical window. Given a panel of daily close/volume observations it
//! computes dollar-neutral positions, derives daily PnL and turnover, and
//! summarizes each calendar year with annualized risk/return metrics:
//!
//! - **PnL** in dollars and as percent of gross capital
//! - **Information ratio** and annualized **Sharpe ratio**
//! - **Turnover** and **margin** (PnL per dollar traded)
//! - **Fitness**, balancing return against trading activity
//! - **Drawdown**, the worst chain of consecutive losing days
//!
//! The pipeline is generic over any signal implementing the
//! [`SignalFunction`](signal::SignalFunction) trait; a five-day price
//! reversion signal ships as the worked example.
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sigeval::{
//!     config::BacktestConfig,
//!     data::CsvDataSource,
//!     engine::Engine,
//!     report::MetricsFormatter,
//!     signal::FiveDayReversion,
//! };
//!
//! let config = BacktestConfig::new(
//!     vec!["AAPL".into(), "MSFT".into(), "GOOG".into()],
//!     NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
//!     50_000.0,
//! );
//!
//! let engine = Engine::new(config).unwrap();
//! let source = CsvDataSource::new("data/us10.csv");
//! let result = engine.run_with_source(&FiveDayReversion, &source).unwrap();
//!
//! MetricsFormatter::print_report(&result);
//! ```
//!
//! # Custom Signals
//!
//! Implement [`SignalFunction`](signal::SignalFunction) to evaluate your own
//! signal. The contract: one value per panel row, aligned with row order,
//! `None` where history is insufficient, and no lookahead — the value at date
//! `t` may only depend on data dated `t` or earlier.
//!
//! ```
//! use sigeval::signal::SignalFunction;
//! use sigeval::types::Panel;
//!
//! struct AlwaysLong;
//!
//! impl SignalFunction for AlwaysLong {
//!     fn name(&self) -> &str {
//!         "always-long"
//!     }
//!
//!     fn compute(&self, panel: &Panel) -> Vec<Option<f64>> {
//!         vec![Some(1.0); panel.len()]
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: the panel data store ([`Panel`](types::Panel), [`PanelRow`](types::PanelRow))
//! - [`data`]: CSV loading and the [`DataSource`](data::DataSource) collaborator seam
//! - [`config`]: backtest configuration and validation
//! - [`signal`]: the signal contract and the built-in reversion signal
//! - [`position`]: dollar-neutral position generation
//! - [`pnl`]: daily PnL and turnover derivation
//! - [`metrics`]: annual aggregation and drawdown analysis
//! - [`engine`]: pipeline orchestration
//! - [`report`]: table rendering and CSV export of the annual metrics

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod pnl;
pub mod position;
pub mod report;
pub mod signal;
pub mod types;

// Re-exports for convenience
pub use config::{BacktestConfig, Neutralization};
pub use data::{load_csv, CsvDataSource, DataConfig, DataSource};
pub use engine::{BacktestResult, Engine};
pub use error::{Result, SigevalError};
pub use metrics::{annual_metrics, max_drawdown, YearMetrics, TRADING_DAYS_PER_YEAR};
pub use report::MetricsFormatter;
pub use signal::{attach_signal, FiveDayReversion, SignalFunction};
pub use types::{Panel, PanelRow};
