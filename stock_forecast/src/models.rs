//! Forecasting models for daily price series

use crate::data::TrainingRow;
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::path::Path;

/// One predicted date with its decomposition and uncertainty bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Date stamp
    pub ds: NaiveDate,
    /// Trend component
    pub trend: f64,
    /// Weekly seasonal component (0 when not fitted)
    pub weekly: f64,
    /// Yearly seasonal component (0 when not fitted)
    pub yearly: f64,
    /// Predicted value
    pub yhat: f64,
    /// Lower uncertainty bound
    pub yhat_lower: f64,
    /// Upper uncertainty bound
    pub yhat_upper: f64,
}

/// Forecast over the history dates followed by the future dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
    history_len: usize,
}

impl ForecastTable {
    /// Create a forecast table whose first `history_len` rows cover the history
    pub fn new(rows: Vec<ForecastRow>, history_len: usize) -> Result<Self> {
        if history_len > rows.len() {
            return Err(ForecastError::DataError(format!(
                "History length ({}) exceeds forecast length ({})",
                history_len,
                rows.len()
            )));
        }

        Ok(Self { rows, history_len })
    }

    /// All rows, date ascending
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows that fall on history dates
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Rows on history dates
    pub fn history(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len]
    }

    /// Rows after the last history date
    pub fn future(&self) -> &[ForecastRow] {
        &self.rows[self.history_len..]
    }

    /// Last `n` rows (fewer if the table is shorter)
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Build a DataFrame with one column per [`ForecastRow`] field
    pub fn frame_of(rows: &[ForecastRow]) -> Result<DataFrame> {
        let column = |f: fn(&ForecastRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();
        let ds: Vec<String> = rows.iter().map(|r| r.ds.to_string()).collect();

        Ok(DataFrame::new(vec![
            Series::new("ds", ds),
            Series::new("trend", column(|r| r.trend)),
            Series::new("weekly", column(|r| r.weekly)),
            Series::new("yearly", column(|r| r.yearly)),
            Series::new("yhat", column(|r| r.yhat)),
            Series::new("yhat_lower", column(|r| r.yhat_lower)),
            Series::new("yhat_upper", column(|r| r.yhat_upper)),
        ])?)
    }

    /// The whole forecast as a DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Self::frame_of(&self.rows)
    }

    /// Write the forecast as CSV
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        Ok(())
    }
}

/// Seasonal shapes of a trained model, for component plots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalProfiles {
    /// Weekly effect for Sunday through Saturday
    pub weekly: Option<Vec<(Weekday, f64)>>,
    /// Yearly effect for each day of a reference year
    pub yearly: Option<Vec<(NaiveDate, f64)>>,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Dates the model was trained on
    fn history_dates(&self) -> &[NaiveDate];

    /// History dates followed by `periods` consecutive calendar days
    fn make_future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        let history = self.history_dates();
        let mut dates = Vec::with_capacity(history.len() + periods);
        dates.extend_from_slice(history);

        if let Some(&last) = history.last() {
            dates.extend((1..=periods as u64).filter_map(|d| last.checked_add_days(Days::new(d))));
        }
        dates
    }

    /// Predict every date in `dates`
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastTable>;

    /// Seasonal shapes for component plots
    fn seasonal_profiles(&self) -> Result<SeasonalProfiles>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on `{ds, y}` rows
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on training rows
    fn train(&self, rows: &[TrainingRow]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod prophet;
