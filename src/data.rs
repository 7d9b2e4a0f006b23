//! Panel loading and the external market-data seam.
//!
//! The pipeline itself never talks to a market-data provider. It consumes a
//! [`Panel`] obtained through the [`DataSource`] trait; the shipped
//! implementation reads a cleaned CSV export of (date, instrument, close,
//! volume) rows. Provider failures surface as
//! [`SigevalError::DataFetch`](crate::error::SigevalError::DataFetch) so the
//! caller can tell a bad feed apart from a bad configuration.

use crate::error::{Result, SigevalError};
use crate::types::{Panel, PanelRow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Raw CSV row with flexible header names.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "date", alias = "DATE")]
    date: String,
    #[serde(
        alias = "Ticker",
        alias = "ticker",
        alias = "Symbol",
        alias = "symbol",
        alias = "Instrument",
        alias = "instrument"
    )]
    instrument: String,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", alias = "vol", default)]
    volume: f64,
}

/// CSV parsing configuration.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Date format string (defaults to `%Y-%m-%d`).
    pub date_format: String,
    /// Whether the CSV has a header row.
    pub has_headers: bool,
    /// CSV delimiter character.
    pub delimiter: u8,
    /// Skip unparseable or non-finite rows instead of failing.
    pub skip_invalid: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            has_headers: true,
            delimiter: b',',
            skip_invalid: true,
        }
    }
}

/// Load a panel from a CSV file of (date, instrument, close, volume) rows.
pub fn load_csv(path: impl AsRef<Path>, config: &DataConfig) -> Result<Panel> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(config.has_headers)
        .delimiter(config.delimiter)
        .flexible(false)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize::<CsvRow>() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) if config.skip_invalid => {
                warn!("Skipping malformed CSV row: {e}");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let date = match NaiveDate::parse_from_str(&raw.date, &config.date_format) {
            Ok(date) => date,
            Err(e) if config.skip_invalid => {
                warn!("Skipping row with unparseable date {:?}: {e}", raw.date);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !raw.close.is_finite() {
            if config.skip_invalid {
                warn!("Skipping row ({date}, {}) with non-finite close", raw.instrument);
                skipped += 1;
                continue;
            }
            return Err(SigevalError::Data(format!(
                "non-finite close for ({date}, {})",
                raw.instrument
            )));
        }

        rows.push(PanelRow::new(date, raw.instrument, raw.close, raw.volume));
    }

    info!(
        "Loaded {} panel rows from {} ({} skipped)",
        rows.len(),
        path.display(),
        skipped
    );
    Panel::from_rows(rows)
}

/// External market-data collaborator.
///
/// Implementations deliver a cleaned panel for a universe over a date window.
/// Any provider-side failure (unreachable source, unknown ticker, empty
/// payload) must come back as `DataFetch` rather than an empty panel.
pub trait DataSource: Send + Sync {
    fn fetch(&self, universe: &[String], start: NaiveDate, end: NaiveDate) -> Result<Panel>;
}

/// [`DataSource`] backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
    config: DataConfig,
}

impl CsvDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: DataConfig::default(),
        }
    }

    pub fn with_config(path: impl Into<PathBuf>, config: DataConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

impl DataSource for CsvDataSource {
    fn fetch(&self, universe: &[String], start: NaiveDate, end: NaiveDate) -> Result<Panel> {
        let panel = load_csv(&self.path, &self.config)
            .map_err(|e| SigevalError::DataFetch(format!("{}: {e}", self.path.display())))?;

        let mut rows: Vec<PanelRow> = panel
            .rows()
            .iter()
            .filter(|r| {
                r.date >= start && r.date <= end && universe.iter().any(|u| *u == r.instrument)
            })
            .cloned()
            .collect();

        // Flag universe members the file knows nothing about.
        for ticker in universe {
            if !rows.iter().any(|r| r.instrument == *ticker) {
                return Err(SigevalError::DataFetch(format!(
                    "no data for instrument {ticker} in {} between {start} and {end}",
                    self.path.display()
                )));
            }
        }

        if rows.is_empty() {
            return Err(SigevalError::DataFetch(format!(
                "{} contains no rows between {start} and {end}",
                self.path.display()
            )));
        }

        rows.sort_by(|a, b| {
            a.instrument
                .cmp(&b.instrument)
                .then_with(|| a.date.cmp(&b.date))
        });
        Panel::from_rows(rows)
    }
}
