//! Signal function contract and the built-in example signal.

use crate::error::{Result, SigevalError};
use crate::types::Panel;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Trait all signal functions implement.
///
/// `compute` returns one value per panel row, aligned with `panel.rows()`
/// order, with `None` where the signal is undefined (insufficient lookback).
/// Implementations must be deterministic and must not look ahead: the value
/// for a row at date `t` may depend only on data dated `t` or earlier.
pub trait SignalFunction: Send + Sync {
    /// Name of the signal, used in reports and logs.
    fn name(&self) -> &str;

    /// Compute the signal column for the given panel.
    fn compute(&self, panel: &Panel) -> Vec<Option<f64>>;

    /// Minimum per-instrument history (in rows) before the first defined value.
    fn lookback(&self) -> usize {
        0
    }
}

/// Compute a signal and write it into the panel's `signal` column.
pub fn attach_signal(panel: &mut Panel, signal: &dyn SignalFunction) -> Result<()> {
    let values = signal.compute(panel);
    if values.len() != panel.len() {
        return Err(SigevalError::Data(format!(
            "signal {:?} returned {} values for {} panel rows",
            signal.name(),
            values.len(),
            panel.len()
        )));
    }

    let defined = values.iter().filter(|v| v.is_some()).count();
    for (row, value) in panel.rows_mut().iter_mut().zip(values) {
        row.signal = value;
    }
    info!(
        "Signal {:?}: {defined}/{} rows defined",
        signal.name(),
        panel.len()
    );
    Ok(())
}

/// Five-day price reversion.
///
/// Raw value per instrument: `(close[t] - close[t-5]) / close[t]`. Raw values
/// are then rescaled per date so the largest absolute value across instruments
/// on that date is 1. The rescale only uses same-date data, so no future
/// observation can influence an earlier signal value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiveDayReversion;

impl FiveDayReversion {
    const LOOKBACK: usize = 5;
}

impl SignalFunction for FiveDayReversion {
    fn name(&self) -> &str {
        "five-day-reversion"
    }

    fn lookback(&self) -> usize {
        Self::LOOKBACK
    }

    fn compute(&self, panel: &Panel) -> Vec<Option<f64>> {
        let rows = panel.rows();
        let mut values: Vec<Option<f64>> = vec![None; rows.len()];

        // Raw reversion per instrument. Instruments are independent here, so
        // the per-instrument scans run in parallel.
        let groups: Vec<Vec<usize>> = panel.by_instrument().into_values().collect();
        let partials: Vec<Vec<(usize, f64)>> = groups
            .par_iter()
            .map(|indices| {
                let mut out = Vec::with_capacity(indices.len().saturating_sub(Self::LOOKBACK));
                for (pos, &i) in indices.iter().enumerate() {
                    if pos < Self::LOOKBACK {
                        continue;
                    }
                    let prev = rows[indices[pos - Self::LOOKBACK]].close;
                    let raw = (rows[i].close - prev) / rows[i].close;
                    if raw.is_finite() {
                        out.push((i, raw));
                    }
                }
                out
            })
            .collect();

        for (i, raw) in partials.into_iter().flatten() {
            values[i] = Some(raw);
        }

        // Cross-sectional rescale: unit maximum magnitude per date.
        let mut max_by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(raw) = values[i] {
                let entry = max_by_date.entry(row.date).or_insert(0.0);
                *entry = entry.max(raw.abs());
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if let Some(raw) = values[i] {
                let max_abs = max_by_date[&row.date];
                if max_abs > 0.0 {
                    values[i] = Some(raw / max_abs);
                }
            }
        }

        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PanelRow;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn panel_from_closes(closes: &[(&str, &[f64])]) -> Panel {
        let mut rows = Vec::new();
        for (instrument, series) in closes {
            for (i, close) in series.iter().enumerate() {
                rows.push(PanelRow::new(
                    d(2020, 1, 1) + chrono::Duration::days(i as i64),
                    *instrument,
                    *close,
                    1_000.0,
                ));
            }
        }
        Panel::from_rows(rows).unwrap()
    }

    #[test]
    fn test_first_five_days_have_no_signal() {
        let panel = panel_from_closes(&[("A", &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0])]);
        let values = FiveDayReversion.compute(&panel);

        assert!(values[..5].iter().all(|v| v.is_none()));
        assert!(values[5].is_some());
        assert!(values[6].is_some());
    }

    #[test]
    fn test_raw_reversion_formula() {
        // Single instrument: its own value is the date maximum, so the
        // rescaled signal is +/-1 wherever defined.
        let panel = panel_from_closes(&[("A", &[10.0, 10.0, 10.0, 10.0, 10.0, 12.0])]);
        let values = FiveDayReversion.compute(&panel);

        // raw = (12 - 10) / 12, rescaled by itself to 1.
        assert!((values[5].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_sectional_rescale() {
        // Two instruments on the same dates; B moves twice as hard as A.
        let panel = panel_from_closes(&[
            ("A", &[100.0, 100.0, 100.0, 100.0, 100.0, 101.0]),
            ("B", &[100.0, 100.0, 100.0, 100.0, 100.0, 102.0]),
        ]);
        let values = FiveDayReversion.compute(&panel);

        let by_inst = panel.by_instrument();
        let a = values[by_inst["A"][5]].unwrap();
        let b = values[by_inst["B"][5]].unwrap();

        assert!((b - 1.0).abs() < 1e-12);
        assert!(a > 0.0 && a < 1.0);
        // raw_a / raw_b = (1/101) / (2/102)
        let expected = (1.0 / 101.0) / (2.0 / 102.0);
        assert!((a - expected).abs() < 1e-12);
    }

    #[test]
    fn test_flat_series_keeps_zero_signal() {
        let panel = panel_from_closes(&[("A", &[10.0; 8])]);
        let values = FiveDayReversion.compute(&panel);

        for value in &values[5..] {
            assert_eq!(*value, Some(0.0));
        }
    }

    #[test]
    fn test_attach_signal_writes_column() {
        let mut panel = panel_from_closes(&[("A", &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0])]);
        attach_signal(&mut panel, &FiveDayReversion).unwrap();

        assert!(panel.rows()[4].signal.is_none());
        assert!(panel.rows()[5].signal.is_some());
    }

    struct MisalignedSignal;

    impl SignalFunction for MisalignedSignal {
        fn name(&self) -> &str {
            "misaligned"
        }

        fn compute(&self, _panel: &Panel) -> Vec<Option<f64>> {
            vec![Some(1.0)]
        }
    }

    #[test]
    fn test_attach_rejects_misaligned_column() {
        let mut panel = panel_from_closes(&[("A", &[10.0, 11.0, 12.0])]);
        let err = attach_signal(&mut panel, &MisalignedSignal).unwrap_err();
        assert!(matches!(err, SigevalError::Data(_)));
    }
}
