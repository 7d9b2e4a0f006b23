//! Rendering of annual metrics for human and machine consumption.

use crate::engine::BacktestResult;
use crate::metrics::YearMetrics;
use colored::Colorize;
use tabled::{builder::Builder, settings::Style};

/// Formats backtest results. Rendering only; where the output goes is the
/// caller's concern.
pub struct MetricsFormatter;

impl MetricsFormatter {
    /// Render the annual metrics as a rounded table.
    pub fn render_table(years: &[YearMetrics]) -> String {
        let mut builder = Builder::new();
        builder.push_record([
            "Year", "PnL $", "PnL %", "IR", "Sharpe", "Turnover %", "Margin", "Fitness",
            "Drawdown %",
        ]);

        for y in years {
            builder.push_record([
                y.year.to_string(),
                format!("{:.2}", y.total_pnl),
                format!("{:.2}", y.pnl_pct),
                Self::format_ratio(y.ir),
                Self::format_ratio(y.sharpe),
                format!("{:.2}", y.turnover_pct),
                Self::format_ratio(y.margin),
                Self::format_ratio(y.fitness),
                format!("{:.2}", y.drawdown_pct),
            ]);
        }

        builder.build().with(Style::rounded()).to_string()
    }

    /// Print a summary report to stdout.
    pub fn print_report(result: &BacktestResult) {
        println!();
        println!("{}", "═".repeat(72).blue());
        println!("{}", format!(" SIGNAL EVALUATION: {} ", result.signal_name).bold().blue());
        println!("{}", "═".repeat(72).blue());
        println!(
            "  Universe: {} instruments, {} to {}",
            result.config.universe.len(),
            result.config.start,
            result.config.end
        );
        println!(
            "  Investment: ${:.2} per book, neutralization: {}",
            result.config.investment, result.config.neutralization
        );
        println!("  Observations: {}", result.observations);
        println!();
        println!("{}", Self::render_table(&result.years));
        println!("{}", "═".repeat(72).blue());
    }

    /// Export one year as a CSV line matching [`csv_header`](Self::csv_header).
    pub fn to_csv_line(y: &YearMetrics) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            y.year,
            y.total_pnl,
            y.pnl_pct,
            y.ir,
            y.sharpe,
            y.turnover_pct,
            y.margin,
            y.fitness,
            y.drawdown_pct
        )
    }

    /// CSV header row for [`to_csv_line`](Self::to_csv_line).
    pub fn csv_header() -> &'static str {
        "year,total_pnl,pnl_pct,ir,sharpe,turnover_pct,margin,fitness,drawdown_pct"
    }

    /// NaN-aware ratio formatting; degenerate metrics render as "-".
    fn format_ratio(value: f64) -> String {
        if value.is_nan() {
            "-".to_string()
        } else {
            format!("{value:.2}")
        }
    }
}
