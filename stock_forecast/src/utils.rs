//! Utility functions for the stock_forecast crate

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Fixed start of every historical window
pub const DEFAULT_HISTORY_START: (i32, u32, u32) = (2018, 1, 1);

/// Days per forecast year; leap days are not counted
pub const DAYS_PER_YEAR: usize = 365;

/// Smallest selectable horizon, in years
pub const MIN_HORIZON_YEARS: u32 = 1;

/// Largest selectable horizon, in years
pub const MAX_HORIZON_YEARS: u32 = 5;

/// The default history start date
pub fn default_history_start() -> NaiveDate {
    let (y, m, d) = DEFAULT_HISTORY_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Convert a horizon in years to a number of future daily periods (`years * 365`)
pub fn horizon_days(years: u32) -> Result<usize> {
    if !(MIN_HORIZON_YEARS..=MAX_HORIZON_YEARS).contains(&years) {
        return Err(ForecastError::InvalidParameter(format!(
            "Horizon must be between {} and {} years, got {}",
            MIN_HORIZON_YEARS, MAX_HORIZON_YEARS, years
        )));
    }
    Ok(years as usize * DAYS_PER_YEAR)
}

/// Error metrics of `forecast` against `actual`, paired by position.
///
/// MAPE skips zero actuals but still averages over every pair.
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(format!(
            "Cannot score {} predictions against {} observations",
            forecast.len(),
            actual.len()
        )));
    }

    let n = forecast.len() as f64;
    let (mut abs_sum, mut sq_sum, mut pct_sum, mut sym_sum) = (0.0, 0.0, 0.0, 0.0);
    for (&f, &a) in forecast.iter().zip(actual) {
        let err = (a - f).abs();
        abs_sum += err;
        sq_sum += err * err;
        if a != 0.0 {
            pct_sum += 100.0 * err / a.abs();
        }
        let scale = a.abs() + f.abs();
        if scale > 0.0 {
            sym_sum += 200.0 * err / scale;
        }
    }

    let mse = sq_sum / n;
    Ok(ForecastAccuracy {
        mae: abs_sum / n,
        mse,
        rmse: mse.sqrt(),
        mape: pct_sum / n,
        smape: sym_sum / n,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "In-sample Fit:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
