//! Position generation: dollar-neutral sizing of the signal.

use crate::config::Neutralization;
use crate::types::{Panel, PanelRow};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Convert signal values into dollar positions, one date at a time.
///
/// Rows with a valid signal are split into a short book (signal < 0) and a
/// long book (signal >= 0). Each book is scaled so its positions sum to
/// -investment and +investment respectively. An empty book simply contributes
/// no exposure that day. A book whose signals sum to exactly zero cannot be
/// scaled; its instruments get zero positions instead of an infinite scale.
pub fn generate_positions(panel: &mut Panel, investment: f64, neutralization: Neutralization) {
    match neutralization {
        Neutralization::All => neutralize_all(panel, investment),
    }
}

fn neutralize_all(panel: &mut Panel, investment: f64) {
    let by_date = panel.by_date();
    let rows = panel.rows_mut();
    let mut sized_days = 0usize;

    for (date, indices) in by_date {
        let mut shorts: Vec<usize> = Vec::new();
        let mut longs: Vec<usize> = Vec::new();
        for &i in &indices {
            match rows[i].signal {
                Some(s) if s < 0.0 => shorts.push(i),
                Some(_) => longs.push(i),
                None => {}
            }
        }

        scale_book(rows, &shorts, -investment, date, "short");
        scale_book(rows, &longs, investment, date, "long");

        if !shorts.is_empty() || !longs.is_empty() {
            sized_days += 1;
        }
    }

    info!("Generated positions for {sized_days} trading days");
}

/// Scale one book so its positions sum to `target`.
fn scale_book(rows: &mut [PanelRow], book: &[usize], target: f64, date: NaiveDate, side: &str) {
    if book.is_empty() {
        return;
    }

    let signal_sum: f64 = book.iter().filter_map(|&i| rows[i].signal).sum();
    if signal_sum == 0.0 {
        // Degenerate book: no finite scale exists. Zero positions, not NaN.
        warn!("Zero-sum {side} book on {date}; assigning zero positions");
        for &i in book {
            rows[i].position = Some(0.0);
        }
        return;
    }

    let scale = target / signal_sum;
    for &i in book {
        let signal = rows[i].signal.unwrap_or(0.0);
        rows[i].position = Some(scale * signal);
    }
}
