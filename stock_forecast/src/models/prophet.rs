//! Prophet forecasting model backed by `augurs`
//!
//! Dates go to the engine as midnight-UTC timestamps. Trend changepoints,
//! yearly and weekly seasonality and the 80% uncertainty interval all use
//! the engine's defaults; seasonal components are switched on from the span
//! and spacing of the history.

use crate::data::TrainingRow;
use crate::error::{ForecastError, Result};
use crate::models::{
    ForecastModel, ForecastRow, ForecastTable, SeasonalProfiles, TrainedForecastModel,
};
use augurs::prophet::wasmstan::WasmstanOptimizer;
use augurs::prophet::{PredictionData, Prophet, TrainingData};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use trade_math::stats;

/// Width of the engine's default uncertainty interval
pub const INTERVAL_WIDTH: f64 = 0.8;

const WEEKLY: &str = "weekly";
const YEARLY: &str = "yearly";

/// Prophet with its default settings
#[derive(Debug, Clone)]
pub struct ProphetModel {
    /// Name of the model
    name: String,
}

impl Default for ProphetModel {
    fn default() -> Self {
        Self {
            name: "Prophet".to_string(),
        }
    }
}

impl ProphetModel {
    /// Create a model with the default settings
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForecastModel for ProphetModel {
    type Trained = TrainedProphetModel;

    fn train(&self, rows: &[TrainingRow]) -> Result<Self::Trained> {
        if rows.len() < 2 {
            return Err(ForecastError::EngineFailure(format!(
                "need at least 2 rows to fit, got {}",
                rows.len()
            )));
        }
        if rows.iter().any(|r| !r.y.is_finite()) {
            return Err(ForecastError::EngineFailure(
                "training values must be finite".to_string(),
            ));
        }

        // one row per date, the last one given wins
        let mut sorted = rows.to_vec();
        sorted.sort_by_key(|r| r.ds);
        sorted.reverse();
        sorted.dedup_by_key(|r| r.ds);
        sorted.reverse();
        if sorted.len() < 2 {
            return Err(ForecastError::EngineFailure(
                "training rows must cover at least two distinct dates".to_string(),
            ));
        }

        let ds = sorted
            .iter()
            .map(|r| date_to_ts(r.ds))
            .collect::<Result<Vec<i64>>>()?;
        let y: Vec<f64> = sorted.iter().map(|r| r.y).collect();

        let data = TrainingData::new(ds, y.clone())
            .map_err(|e| ForecastError::EngineFailure(format!("training data: {}", e)))?;
        let mut prophet = Prophet::new(Default::default(), WasmstanOptimizer::new());
        prophet
            .fit(data, Default::default())
            .map_err(|e| ForecastError::EngineFailure(format!("fit: {}", e)))?;

        log::debug!(
            "fitted {} rows from {} to {}",
            sorted.len(),
            sorted[0].ds,
            sorted[sorted.len() - 1].ds
        );

        Ok(TrainedProphetModel {
            name: self.name.clone(),
            prophet,
            history_dates: sorted.iter().map(|r| r.ds).collect(),
            fallback_margin: z_score(INTERVAL_WIDTH)? * stats::std_dev(&y)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted Prophet model
pub struct TrainedProphetModel {
    name: String,
    prophet: Prophet<WasmstanOptimizer>,
    history_dates: Vec<NaiveDate>,
    /// Half-width of the band used when the engine returns no interval
    fallback_margin: f64,
}

impl fmt::Debug for TrainedProphetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedProphetModel")
            .field("name", &self.name)
            .field("history_rows", &self.history_dates.len())
            .field("fallback_margin", &self.fallback_margin)
            .finish_non_exhaustive()
    }
}

impl TrainedForecastModel for TrainedProphetModel {
    fn history_dates(&self) -> &[NaiveDate] {
        &self.history_dates
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastTable> {
        let n = dates.len();
        let ds = dates
            .iter()
            .map(|d| date_to_ts(*d))
            .collect::<Result<Vec<i64>>>()?;
        let predictions = self
            .prophet
            .predict(Some(PredictionData::new(ds)))
            .map_err(|e| ForecastError::EngineFailure(format!("predict: {}", e)))?;

        let point = &predictions.yhat.point;
        let trend = &predictions.trend.point;
        if point.len() != n || trend.len() != n {
            return Err(ForecastError::EngineFailure(format!(
                "engine returned {} predictions for {} dates",
                point.len(),
                n
            )));
        }

        let (lower, upper) = match (&predictions.yhat.lower, &predictions.yhat.upper) {
            (Some(lower), Some(upper)) if lower.len() == n && upper.len() == n => {
                (lower.clone(), upper.clone())
            }
            _ => {
                log::debug!("no interval from the engine, using ±{:.4}", self.fallback_margin);
                (
                    point.iter().map(|v| v - self.fallback_margin).collect(),
                    point.iter().map(|v| v + self.fallback_margin).collect(),
                )
            }
        };
        let component = |name: &str| -> Vec<f64> {
            predictions
                .seasonalities
                .get(name)
                .map(|s| s.point.clone())
                .filter(|p| p.len() == n)
                .unwrap_or_else(|| vec![0.0; n])
        };
        let weekly = component(WEEKLY);
        let yearly = component(YEARLY);

        let rows: Vec<ForecastRow> = (0..n)
            .map(|i| ForecastRow {
                ds: dates[i],
                trend: trend[i],
                weekly: weekly[i],
                yearly: yearly[i],
                yhat: point[i],
                yhat_lower: lower[i],
                yhat_upper: upper[i],
            })
            .collect();

        let last_history = self.history_dates.last().copied();
        let history_len = rows
            .iter()
            .take_while(|r| Some(r.ds) <= last_history)
            .count();
        ForecastTable::new(rows, history_len)
    }

    fn seasonal_profiles(&self) -> Result<SeasonalProfiles> {
        // 2017-01-01 is a Sunday and 2017 is not a leap year
        let reference: Vec<NaiveDate> = NaiveDate::from_ymd_opt(2017, 1, 1)
            .map(|start| {
                (0..365)
                    .filter_map(|n| start.checked_add_days(Days::new(n)))
                    .collect()
            })
            .unwrap_or_default();
        let ds = reference
            .iter()
            .map(|d| date_to_ts(*d))
            .collect::<Result<Vec<i64>>>()?;

        let predictions = self
            .prophet
            .predict(Some(PredictionData::new(ds)))
            .map_err(|e| ForecastError::EngineFailure(format!("predict: {}", e)))?;

        let weekly = predictions.seasonalities.get(WEEKLY).map(|s| {
            reference
                .iter()
                .zip(&s.point)
                .take(7)
                .map(|(d, v)| (d.weekday(), *v))
                .collect::<Vec<(Weekday, f64)>>()
        });
        let yearly = predictions.seasonalities.get(YEARLY).map(|s| {
            reference
                .iter()
                .zip(&s.point)
                .map(|(d, v)| (*d, *v))
                .collect::<Vec<(NaiveDate, f64)>>()
        });

        Ok(SeasonalProfiles { weekly, yearly })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Midnight UTC of `date`, in seconds
fn date_to_ts(date: NaiveDate) -> Result<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ForecastError::DataError(format!("invalid date for timestamp: {}", date)))
}

fn z_score(interval_width: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::EngineFailure(format!("standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + interval_width / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_to_ts() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(date_to_ts(date).unwrap(), 1_514_764_800);
    }

    #[test]
    fn test_z_score() {
        // 80% two-sided interval
        assert!((z_score(INTERVAL_WIDTH).unwrap() - 1.2816).abs() < 1e-3);
    }
}
