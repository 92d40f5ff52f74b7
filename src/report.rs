//! Text sections and CSV export of a pipeline report

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use stock_forecast::models::ForecastTable;
use stock_forecast::{PipelineReport, PriceHistory};

/// Rows shown in each tail table
pub const TAIL_ROWS: usize = 5;

/// Symbol made safe for use in a file name (`^GSPC` → `_GSPC`)
pub fn file_stem(symbol: &str) -> String {
    symbol
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write the raw and forecast sections of `report` to `out`
pub fn print_report<W: Write>(report: &PipelineReport, out: &mut W) -> Result<()> {
    let history = &report.history;
    match history.date_range() {
        Some((first, last)) => writeln!(
            out,
            "{} ({}): {} daily rows from {} to {} (window end {})",
            report.symbol,
            report.market,
            history.len(),
            first,
            last,
            report.window.end
        )?,
        None => writeln!(out, "{} ({}): no rows", report.symbol, report.market)?,
    }

    writeln!(out)?;
    writeln!(out, "Raw data")?;
    writeln!(out, "{}", PriceHistory::frame_of(history.tail(TAIL_ROWS))?)?;

    writeln!(out)?;
    writeln!(out, "Forecast data")?;
    match &report.forecast {
        Ok(output) => {
            writeln!(out, "{}", ForecastTable::frame_of(output.table.tail(TAIL_ROWS))?)?;
            writeln!(
                out,
                "{}: {} training rows, {} future days",
                output.model_name, output.training_rows, output.periods
            )?;
            if let Some(accuracy) = &output.accuracy {
                write!(out, "{}", accuracy)?;
            }
        }
        Err(e) => writeln!(out, "Forecast unavailable: {}", e)?,
    }

    Ok(())
}

/// Write the raw table, and the forecast table when present, as CSV files
pub fn export_csv(report: &PipelineReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let stem = file_stem(&report.symbol);
    let mut written = Vec::with_capacity(2);

    let raw = out_dir.join(format!("{stem}_raw.csv"));
    report.history.write_csv(&raw)?;
    written.push(raw);

    if let Ok(output) = &report.forecast {
        let forecast = out_dir.join(format!("{stem}_forecast.csv"));
        output.table.write_csv(&forecast)?;
        written.push(forecast);
    }

    Ok(written)
}
