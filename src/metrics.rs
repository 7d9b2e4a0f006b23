//! Annual performance metrics and drawdown analysis.
//!
//! Aggregates the per-row pnl/turnover columns into one summary row per
//! calendar year. Degenerate years (a single trading day, zero PnL variance,
//! zero turnover) produce NaN for the affected ratios rather than a panic or
//! an infinity; the remaining metrics of such a year are still reported.

use crate::types::Panel;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Annualization factor: assumed trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    pub year: i32,
    /// Sum of all per-instrument pnl in the year, in dollars.
    pub total_pnl: f64,
    /// Return on gross capital: `100 * total_pnl / (2 * investment)`.
    pub pnl_pct: f64,
    /// Information ratio: `pnl_pct` over the std dev of daily aggregate pnl.
    pub ir: f64,
    /// Annualized information ratio: `ir * sqrt(252)`.
    pub sharpe: f64,
    /// Annualized turnover as percent of gross capital.
    pub turnover_pct: f64,
    /// Dollars of pnl per 100 dollars traded.
    pub margin: f64,
    /// `sharpe * sqrt(|pnl_pct| / turnover_pct)`.
    pub fitness: f64,
    /// Worst chain of consecutive losing days, as percent of investment (>= 0).
    pub drawdown_pct: f64,
}

/// Aggregate a fully derived panel into one metrics row per calendar year.
///
/// Expects the panel to have passed [`drop_incomplete`](crate::pnl::drop_incomplete);
/// rows still missing pnl or trading are ignored.
pub fn annual_metrics(panel: &Panel, investment: f64) -> Vec<YearMetrics> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut pnl_by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut trading_by_year: BTreeMap<i32, f64> = BTreeMap::new();

    for row in panel.rows() {
        if let (Some(pnl), Some(trading)) = (row.pnl, row.trading) {
            *daily.entry(row.date).or_insert(0.0) += pnl;
            *pnl_by_year.entry(row.year()).or_insert(0.0) += pnl;
            *trading_by_year.entry(row.year()).or_insert(0.0) += trading;
        }
    }

    // One aggregate pnl value per trading day, grouped by year in date order.
    let mut daily_by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (date, pnl) in &daily {
        daily_by_year.entry(date.year()).or_default().push(*pnl);
    }

    let mut years = Vec::with_capacity(daily_by_year.len());
    for (year, series) in &daily_by_year {
        let total_pnl = pnl_by_year.get(year).copied().unwrap_or(0.0);
        let trading_sum = trading_by_year.get(year).copied().unwrap_or(0.0);

        let pnl_pct = 100.0 * total_pnl / (2.0 * investment);
        let std = sample_std(series);
        let ir = if std > 0.0 { pnl_pct / std } else { f64::NAN };
        let sharpe = ir * TRADING_DAYS_PER_YEAR.sqrt();
        let turnover_pct =
            100.0 * trading_sum / (2.0 * investment * TRADING_DAYS_PER_YEAR);
        let margin = if trading_sum > 0.0 {
            100.0 * total_pnl / trading_sum
        } else {
            f64::NAN
        };
        let fitness = if turnover_pct > 0.0 {
            sharpe * (pnl_pct.abs() / turnover_pct).sqrt()
        } else {
            f64::NAN
        };
        let drawdown_pct = max_drawdown(series, investment);

        debug!(
            "Year {year}: pnl {total_pnl:.2}, sharpe {sharpe:.2}, \
             turnover {turnover_pct:.2}%, drawdown {drawdown_pct:.2}%"
        );

        years.push(YearMetrics {
            year: *year,
            total_pnl,
            pnl_pct,
            ir,
            sharpe,
            turnover_pct,
            margin,
            fitness,
            drawdown_pct,
        });
    }

    years
}

/// Sample standard deviation (n - 1 denominator). NaN for fewer than two values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Worst chain of consecutive losing days, as a percentage of the investment.
///
/// A single forward scan: a negative day extends the running chain, any
/// non-negative day ends it. The most negative chain sum seen is reported as
/// `-100 * sum / investment`, so the result is >= 0 and exactly 0 when the
/// series has no losing day. A chain reaching the last day simply ends there.
pub fn max_drawdown(daily_pnl: &[f64], investment: f64) -> f64 {
    let mut chain = 0.0_f64;
    let mut worst = 0.0_f64;

    for &value in daily_pnl {
        if value < 0.0 {
            chain += value;
            if chain < worst {
                worst = chain;
            }
        } else {
            chain = 0.0;
        }
    }

    -100.0 * worst / investment
}
