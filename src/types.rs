//! Core data types for the signal evaluation pipeline.

use crate::error::{Result, SigevalError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation in the panel, keyed by (date, instrument).
///
/// `close` and `volume` come from the data source; the remaining columns are
/// filled in by the pipeline stages. `None` marks a missing value, e.g. a
/// signal that lacks lookback history or a first-day PnL with no prior close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub close: f64,
    pub volume: f64,
    /// Signal value, set by a [`SignalFunction`](crate::signal::SignalFunction).
    #[serde(default)]
    pub signal: Option<f64>,
    /// Dollar position. Positive values are the long book, negative the short book.
    #[serde(default)]
    pub position: Option<f64>,
    /// Daily profit/loss in dollars.
    #[serde(default)]
    pub pnl: Option<f64>,
    /// Turnover: absolute day-over-day position change.
    #[serde(default)]
    pub trading: Option<f64>,
}

impl PanelRow {
    /// Create a new row with only the market-data columns populated.
    pub fn new(date: NaiveDate, instrument: impl Into<String>, close: f64, volume: f64) -> Self {
        Self {
            date,
            instrument: instrument.into(),
            close,
            volume,
            signal: None,
            position: None,
            pnl: None,
            trading: None,
        }
    }

    /// Calendar year of the observation.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// True once every pipeline column has been populated.
    pub fn is_complete(&self) -> bool {
        self.signal.is_some()
            && self.position.is_some()
            && self.pnl.is_some()
            && self.trading.is_some()
    }
}

/// In-memory panel of (date, instrument) observations.
///
/// Rows are kept sorted by (instrument, date) so per-instrument time series
/// are contiguous and in chronological order. Grouping by date or instrument
/// is done through explicit index maps rather than label-based lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    /// Build a panel from unordered rows.
    ///
    /// Rows are sorted by (instrument, date); duplicate (date, instrument)
    /// keys are rejected.
    pub fn from_rows(mut rows: Vec<PanelRow>) -> Result<Self> {
        rows.sort_by(|a, b| {
            a.instrument
                .cmp(&b.instrument)
                .then_with(|| a.date.cmp(&b.date))
        });

        for pair in rows.windows(2) {
            if pair[0].instrument == pair[1].instrument && pair[0].date == pair[1].date {
                return Err(SigevalError::Data(format!(
                    "duplicate panel key ({}, {})",
                    pair[0].date, pair[0].instrument
                )));
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [PanelRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group row indices by instrument. Indices within a group are in date order.
    pub fn by_instrument(&self) -> BTreeMap<String, Vec<usize>> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row.instrument.clone()).or_default().push(i);
        }
        groups
    }

    /// Group row indices by date.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, Vec<usize>> {
        let mut groups: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row.date).or_default().push(i);
        }
        groups
    }

    /// Keep only rows matching the predicate. Row order is preserved.
    pub fn retain(&mut self, f: impl FnMut(&PanelRow) -> bool) {
        self.rows.retain(f);
    }
}
