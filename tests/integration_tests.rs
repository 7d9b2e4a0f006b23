//! Integration tests for the signal evaluation pipeline.

use chrono::NaiveDate;
use sigeval::config::{BacktestConfig, Neutralization};
use sigeval::engine::Engine;
use sigeval::metrics::annual_metrics;
use sigeval::pnl::{compute_pnl, drop_incomplete};
use sigeval::position::generate_positions;
use sigeval::signal::{attach_signal, FiveDayReversion, SignalFunction};
use sigeval::types::{Panel, PanelRow};
use std::collections::HashMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Create a synthetic multi-instrument panel with oscillating prices.
fn create_synthetic_panel(instruments: &[&str], days: usize) -> Panel {
    let mut rows = Vec::new();
    for (k, instrument) in instruments.iter().enumerate() {
        let base = 50.0 * (k + 1) as f64;
        for i in 0..days {
            let date = d(2019, 1, 2) + chrono::Duration::days(i as i64);
            let wave = ((i as f64) * 0.7 + k as f64).sin() * 2.0
                + ((i as f64) * 1.3 - k as f64).cos();
            rows.push(PanelRow::new(date, *instrument, base + wave, 1_000_000.0));
        }
    }
    Panel::from_rows(rows).unwrap()
}

/// Signal with preset values per (date, instrument), for scenario tests.
struct FixedSignal {
    values: HashMap<(NaiveDate, String), f64>,
}

impl FixedSignal {
    fn new(values: &[(NaiveDate, &str, f64)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(date, instrument, v)| ((*date, instrument.to_string()), *v))
                .collect(),
        }
    }
}

impl SignalFunction for FixedSignal {
    fn name(&self) -> &str {
        "fixed"
    }

    fn compute(&self, panel: &Panel) -> Vec<Option<f64>> {
        panel
            .rows()
            .iter()
            .map(|r| {
                self.values
                    .get(&(r.date, r.instrument.clone()))
                    .copied()
            })
            .collect()
    }
}

#[test]
fn test_two_instrument_flip_scenario() {
    // A signal = [+1, -1, +1], B signal = [-1, +1, -1], investment = 1000.
    let dates = [d(2020, 1, 2), d(2020, 1, 3), d(2020, 1, 6)];
    let signal = FixedSignal::new(&[
        (dates[0], "A", 1.0),
        (dates[1], "A", -1.0),
        (dates[2], "A", 1.0),
        (dates[0], "B", -1.0),
        (dates[1], "B", 1.0),
        (dates[2], "B", -1.0),
    ]);

    let mut rows = Vec::new();
    for date in dates {
        rows.push(PanelRow::new(date, "A", 100.0, 1_000.0));
        rows.push(PanelRow::new(date, "B", 100.0, 1_000.0));
    }
    let mut panel = Panel::from_rows(rows).unwrap();

    attach_signal(&mut panel, &signal).unwrap();
    generate_positions(&mut panel, 1_000.0, Neutralization::All);
    compute_pnl(&mut panel);

    let position = |date: NaiveDate, instrument: &str| {
        panel
            .rows()
            .iter()
            .find(|r| r.date == date && r.instrument == instrument)
            .unwrap()
            .position
            .unwrap()
    };

    assert!((position(dates[0], "A") - 1_000.0).abs() < 1e-9);
    assert!((position(dates[0], "B") + 1_000.0).abs() < 1e-9);
    assert!((position(dates[1], "A") + 1_000.0).abs() < 1e-9);
    assert!((position(dates[1], "B") - 1_000.0).abs() < 1e-9);
    assert!((position(dates[2], "A") - 1_000.0).abs() < 1e-9);
    assert!((position(dates[2], "B") + 1_000.0).abs() < 1e-9);

    // Turnover on date 2 for A: |(-1000) - (+1000)| = 2000.
    let a_day2 = panel
        .rows()
        .iter()
        .find(|r| r.date == dates[1] && r.instrument == "A")
        .unwrap();
    assert!((a_day2.trading.unwrap() - 2_000.0).abs() < 1e-9);
}

#[test]
fn test_drawdown_chain_scenario_through_aggregation() {
    // Daily aggregate pnl for the year: [-5, -3, 2, -10, -10, 5].
    // chain1 = -8 (cut by the +2 day), chain2 = -20 (cut by the +5 day).
    let daily = [-5.0, -3.0, 2.0, -10.0, -10.0, 5.0];
    let mut rows = Vec::new();
    for (i, pnl) in daily.iter().enumerate() {
        let mut row = PanelRow::new(
            d(2020, 3, 2) + chrono::Duration::days(i as i64),
            "A",
            100.0,
            1_000.0,
        );
        row.signal = Some(1.0);
        row.position = Some(1_000.0);
        row.pnl = Some(*pnl);
        row.trading = Some(100.0);
        rows.push(row);
    }
    let panel = Panel::from_rows(rows).unwrap();

    let years = annual_metrics(&panel, 1_000.0);
    assert_eq!(years.len(), 1);
    // -100 * (-20) / 1000
    assert!((years[0].drawdown_pct - 2.0).abs() < 1e-9);
}

#[test]
fn test_zero_sum_book_does_not_blow_up() {
    // The long book nets to exactly zero; positions must stay finite.
    let date = d(2020, 1, 2);
    let signal = FixedSignal::new(&[
        (date, "A", 0.0),
        (date, "B", 0.0),
        (date, "C", -0.7),
        (date, "D", -0.3),
    ]);

    let mut panel = Panel::from_rows(vec![
        PanelRow::new(date, "A", 100.0, 1_000.0),
        PanelRow::new(date, "B", 100.0, 1_000.0),
        PanelRow::new(date, "C", 100.0, 1_000.0),
        PanelRow::new(date, "D", 100.0, 1_000.0),
    ])
    .unwrap();

    attach_signal(&mut panel, &signal).unwrap();
    generate_positions(&mut panel, 1_000.0, Neutralization::All);

    for row in panel.rows() {
        let position = row.position.unwrap();
        assert!(position.is_finite(), "non-finite position for {}", row.instrument);
    }

    // Degenerate long book is flat; the short book still scales to budget.
    let short_sum: f64 = panel
        .rows()
        .iter()
        .filter_map(|r| r.position)
        .filter(|p| *p < 0.0)
        .sum();
    assert!((short_sum + 1_000.0).abs() < 1e-9);
}

#[test]
fn test_budget_conservation_and_neutrality() {
    let mut panel = create_synthetic_panel(&["A", "B", "C", "D", "E"], 40);
    attach_signal(&mut panel, &FiveDayReversion).unwrap();
    generate_positions(&mut panel, 50_000.0, Neutralization::All);

    for (date, indices) in panel.by_date() {
        let positions: Vec<f64> = indices
            .iter()
            .filter_map(|&i| panel.rows()[i].position)
            .collect();
        let long_sum: f64 = positions.iter().filter(|p| **p > 0.0).sum();
        let short_sum: f64 = positions.iter().filter(|p| **p < 0.0).sum();

        if long_sum > 0.0 && short_sum < 0.0 {
            assert!(
                (long_sum - 50_000.0).abs() < 1e-6,
                "long book off budget on {date}: {long_sum}"
            );
            assert!(
                (short_sum + 50_000.0).abs() < 1e-6,
                "short book off budget on {date}: {short_sum}"
            );
            let net: f64 = positions.iter().sum();
            assert!(net.abs() < 1e-6, "book not neutral on {date}: {net}");
        }
    }
}

#[test]
fn test_full_pipeline_end_to_end() {
    let config = BacktestConfig::new(
        vec!["A".into(), "B".into(), "C".into()],
        d(2019, 1, 1),
        d(2019, 12, 31),
        50_000.0,
    );
    let engine = Engine::new(config).unwrap();
    let panel = create_synthetic_panel(&["A", "B", "C"], 120);

    let result = engine.run(&FiveDayReversion, panel).unwrap();

    assert_eq!(result.years.len(), 1);
    let y = &result.years[0];
    assert_eq!(y.year, 2019);
    assert!(y.total_pnl.is_finite());
    assert!(y.turnover_pct > 0.0);
    assert!(y.drawdown_pct >= 0.0);
    // pnl_pct and total_pnl are the same quantity on two scales.
    assert!((y.pnl_pct - 100.0 * y.total_pnl / 100_000.0).abs() < 1e-9);
}

#[test]
fn test_pipeline_is_idempotent() {
    let config = BacktestConfig::new(
        vec!["A".into(), "B".into(), "C".into(), "D".into()],
        d(2019, 1, 1),
        d(2020, 12, 31),
        50_000.0,
    );
    let engine = Engine::new(config).unwrap();

    let first = engine
        .run(&FiveDayReversion, create_synthetic_panel(&["A", "B", "C", "D"], 500))
        .unwrap();
    let second = engine
        .run(&FiveDayReversion, create_synthetic_panel(&["A", "B", "C", "D"], 500))
        .unwrap();

    assert_eq!(first.years.len(), second.years.len());
    for (a, b) in first.years.iter().zip(&second.years) {
        assert_eq!(a.total_pnl.to_bits(), b.total_pnl.to_bits());
        assert_eq!(a.ir.to_bits(), b.ir.to_bits());
        assert_eq!(a.sharpe.to_bits(), b.sharpe.to_bits());
        assert_eq!(a.turnover_pct.to_bits(), b.turnover_pct.to_bits());
        assert_eq!(a.margin.to_bits(), b.margin.to_bits());
        assert_eq!(a.fitness.to_bits(), b.fitness.to_bits());
        assert_eq!(a.drawdown_pct.to_bits(), b.drawdown_pct.to_bits());
    }
}

#[test]
fn test_warmup_rows_do_not_contaminate_metrics() {
    let mut panel = create_synthetic_panel(&["A", "B"], 30);
    attach_signal(&mut panel, &FiveDayReversion).unwrap();
    generate_positions(&mut panel, 1_000.0, Neutralization::All);
    compute_pnl(&mut panel);
    drop_incomplete(&mut panel);

    // Five lookback days plus the first pnl/trading day are gone.
    assert!(panel.rows().iter().all(|r| r.is_complete()));
    let first_date = panel.rows().iter().map(|r| r.date).min().unwrap();
    assert!(first_date >= d(2019, 1, 2) + chrono::Duration::days(6));
}
