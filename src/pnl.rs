//! PnL and turnover derivation from positions and close prices.

use crate::types::Panel;
use tracing::info;

/// Fill the `pnl` and `trading` columns.
///
/// Per instrument, in date order: the simple daily return is
/// `close[t] / close[t-1] - 1`, pnl is `position[t] * return[t]`, and trading
/// is `|position[t] - position[t-1]|`. The first row of each instrument has no
/// prior close and stays unfilled.
pub fn compute_pnl(panel: &mut Panel) {
    let by_instrument = panel.by_instrument();
    let rows = panel.rows_mut();

    for indices in by_instrument.values() {
        for pair in indices.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            let ret = rows[cur].close / rows[prev].close - 1.0;

            rows[cur].pnl = rows[cur].position.map(|p| p * ret);
            rows[cur].trading = match (rows[cur].position, rows[prev].position) {
                (Some(a), Some(b)) => Some((a - b).abs()),
                _ => None,
            };
        }
    }
}

/// Drop rows missing any pipeline column.
///
/// Removes lookback warm-up rows (no signal), first-day rows (no pnl or
/// trading), and anything else left partially populated, so aggregates only
/// ever see fully derived observations.
pub fn drop_incomplete(panel: &mut Panel) {
    let before = panel.len();
    panel.retain(|row| row.is_complete());
    info!(
        "Dropped {} incomplete rows, {} remain",
        before - panel.len(),
        panel.len()
    );
}
