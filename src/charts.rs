//! SVG charts for a pipeline report
//!
//! Three files per symbol: the raw open/close series, the forecast with its
//! uncertainty band over the observed closes, and the fitted components.

use crate::report::file_stem;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use stock_forecast::models::{ForecastTable, SeasonalProfiles};
use stock_forecast::{PipelineReport, PriceHistory};

const CHART_SIZE: (u32, u32) = (1280, 720);
const PANEL_HEIGHT: u32 = 320;

const OPEN_COLOR: RGBColor = RGBColor(31, 119, 180);
const CLOSE_COLOR: RGBColor = RGBColor(255, 127, 14);
const FORECAST_COLOR: RGBColor = RGBColor(0, 114, 178);
const OBSERVED_COLOR: RGBColor = RGBColor(20, 20, 20);

/// Paths of the charts written for one report
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFiles {
    pub raw: PathBuf,
    /// Missing when the forecast could not be produced
    pub forecast: Option<PathBuf>,
    pub components: Option<PathBuf>,
}

/// Write every chart the report supports into `out_dir`
pub fn write_charts(report: &PipelineReport, out_dir: &Path) -> Result<ChartFiles> {
    let stem = file_stem(&report.symbol);

    let raw = out_dir.join(format!("{stem}_raw.svg"));
    raw_chart(&report.history, &raw)?;

    let (forecast, components) = match &report.forecast {
        Ok(output) => {
            let forecast = out_dir.join(format!("{stem}_forecast.svg"));
            forecast_chart(&report.history, &output.table, report.years, &forecast)?;

            let components = out_dir.join(format!("{stem}_components.svg"));
            components_chart(&output.table, &output.profiles, &components)?;

            (Some(forecast), Some(components))
        }
        Err(_) => (None, None),
    };

    Ok(ChartFiles {
        raw,
        forecast,
        components,
    })
}

/// Open and close prices over the whole history
pub fn raw_chart(history: &PriceHistory, path: &Path) -> Result<()> {
    let (first, last) = history.date_range().context("no price rows to plot")?;
    let records = history.records();
    let y_range = value_range(records.iter().flat_map(|r| [r.open, r.close]));

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Time Series data", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(date_range(first, last), y_range)?;

    chart.configure_mesh().x_labels(8).y_labels(10).draw()?;

    chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (r.date, r.open)),
            &OPEN_COLOR,
        ))?
        .label("stock_open")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], OPEN_COLOR));

    chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (r.date, r.close)),
            &CLOSE_COLOR,
        ))?
        .label("stock_close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Observed closes as points, the prediction as a line and its interval as a band
pub fn forecast_chart(
    history: &PriceHistory,
    table: &ForecastTable,
    years: u32,
    path: &Path,
) -> Result<()> {
    let rows = table.rows();
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.ds, last.ds),
        _ => anyhow::bail!("empty forecast table"),
    };

    let y_range = value_range(
        rows.iter()
            .flat_map(|r| [r.yhat_lower, r.yhat_upper])
            .chain(history.records().iter().map(|r| r.close)),
    );
    let caption = format!(
        "Forecast plot for {} year{}",
        years,
        if years == 1 { "" } else { "s" }
    );

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(date_range(first, last), y_range)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .y_labels(10)
        .x_desc("ds")
        .y_desc("y")
        .draw()?;

    let band: Vec<(NaiveDate, f64)> = rows
        .iter()
        .map(|r| (r.ds, r.yhat_upper))
        .chain(rows.iter().rev().map(|r| (r.ds, r.yhat_lower)))
        .collect();
    chart
        .draw_series(std::iter::once(Polygon::new(band, FORECAST_COLOR.mix(0.2))))?
        .label("uncertainty")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], FORECAST_COLOR.mix(0.2).filled()));

    chart
        .draw_series(LineSeries::new(
            rows.iter().map(|r| (r.ds, r.yhat)),
            FORECAST_COLOR.stroke_width(2),
        ))?
        .label("yhat")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));

    chart
        .draw_series(
            history
                .records()
                .iter()
                .map(|r| Circle::new((r.date, r.close), 2, OBSERVED_COLOR.filled())),
        )?
        .label("observed")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, OBSERVED_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Trend over the forecast dates, then one panel per fitted seasonality
pub fn components_chart(
    table: &ForecastTable,
    profiles: &SeasonalProfiles,
    path: &Path,
) -> Result<()> {
    let rows = table.rows();
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.ds, last.ds),
        _ => anyhow::bail!("empty forecast table"),
    };

    let panels = 1 + profiles.weekly.is_some() as u32 + profiles.yearly.is_some() as u32;
    let root = SVGBackend::new(path, (CHART_SIZE.0, PANEL_HEIGHT * panels)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((panels as usize, 1));
    let mut areas = areas.iter();

    if let Some(area) = areas.next() {
        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(
                date_range(first, last),
                value_range(rows.iter().map(|r| r.trend)),
            )?;
        chart
            .configure_mesh()
            .x_labels(8)
            .y_labels(6)
            .x_desc("ds")
            .y_desc("trend")
            .draw()?;
        chart.draw_series(LineSeries::new(
            rows.iter().map(|r| (r.ds, r.trend)),
            FORECAST_COLOR.stroke_width(2),
        ))?;
    }

    if let (Some(weekly), Some(area)) = (&profiles.weekly, areas.next()) {
        let names: Vec<String> = weekly.iter().map(|(day, _)| day.to_string()).collect();
        let last_index = weekly.len().saturating_sub(1) as i32;

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(
                0..last_index.max(1),
                value_range(weekly.iter().map(|(_, v)| *v)),
            )?;
        chart
            .configure_mesh()
            .x_labels(weekly.len())
            .x_label_formatter(&|i| names.get(*i as usize).cloned().unwrap_or_default())
            .y_labels(6)
            .x_desc("Day of week")
            .y_desc("weekly")
            .draw()?;
        chart.draw_series(LineSeries::new(
            weekly.iter().enumerate().map(|(i, (_, v))| (i as i32, *v)),
            FORECAST_COLOR.stroke_width(2),
        ))?;
    }

    if let (Some(yearly), Some(area)) = (&profiles.yearly, areas.next()) {
        if let (Some(start), Some(end)) = (yearly.first(), yearly.last()) {
            let mut chart = ChartBuilder::on(area)
                .margin(15)
                .x_label_area_size(35)
                .y_label_area_size(60)
                .build_cartesian_2d(
                    date_range(start.0, end.0),
                    value_range(yearly.iter().map(|(_, v)| *v)),
                )?;
            chart
                .configure_mesh()
                .x_labels(12)
                .x_label_formatter(&|d| d.format("%B %-d").to_string())
                .y_labels(6)
                .x_desc("Day of year")
                .y_desc("yearly")
                .draw()?;
            chart.draw_series(LineSeries::new(
                yearly.iter().map(|(d, v)| (*d, *v)),
                FORECAST_COLOR.stroke_width(2),
            ))?;
        }
    }

    root.present()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

// plotters needs a non-empty span on both axes
fn date_range(first: NaiveDate, last: NaiveDate) -> Range<NaiveDate> {
    if last > first {
        first..last
    } else {
        first..first.checked_add_days(Days::new(1)).unwrap_or(first)
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }

    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        lo.abs().max(1.0) * 0.05
    };
    (lo - pad)..(hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_pads() {
        let range = value_range([10.0, 20.0, f64::NAN].into_iter());
        assert!((range.start - 9.5).abs() < 1e-12);
        assert!((range.end - 20.5).abs() < 1e-12);
    }

    #[test]
    fn test_value_range_degenerate() {
        let flat = value_range([5.0, 5.0].into_iter());
        assert!(flat.start < 5.0 && flat.end > 5.0);

        let empty = value_range(std::iter::empty());
        assert_eq!(empty, 0.0..1.0);
    }

    #[test]
    fn test_date_range_is_never_empty() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let range = date_range(day, day);
        assert!(range.end > range.start);
    }
}
