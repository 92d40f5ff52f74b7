//! Price history and training rows
//!
//! `PriceHistory` is the daily table as the provider returns it.
//! [`reshape`] projects it into the `{ds, y}` rows the forecasting engine
//! trains on.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Minimum number of rows a forecast can be fitted on
pub const MIN_TRAINING_ROWS: usize = 2;

/// One trading day of prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Trading date, no time of day
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

/// A `{ds, y}` pair consumed by the forecasting engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    /// Date stamp
    pub ds: NaiveDate,
    /// Observed value (close price)
    pub y: f64,
}

/// Daily price table ordered by date ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    symbol: String,
    records: Vec<PriceRecord>,
}

impl PriceHistory {
    /// Create a price history for `symbol`
    pub fn new(symbol: impl Into<String>, records: Vec<PriceRecord>) -> Self {
        Self {
            symbol: symbol.into(),
            records,
        }
    }

    /// Ticker symbol the history belongs to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All records
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Get the length of the history
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Last `n` records (fewer if the history is shorter)
    pub fn tail(&self, n: usize) -> &[PriceRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Date range covered, or `None` when empty
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Build a Date/Open/High/Low/Close/Volume DataFrame from `records`
    pub fn frame_of(records: &[PriceRecord]) -> Result<DataFrame> {
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        let df = DataFrame::new(vec![
            Series::new("Date", dates),
            Series::new("Open", records.iter().map(|r| r.open).collect::<Vec<f64>>()),
            Series::new("High", records.iter().map(|r| r.high).collect::<Vec<f64>>()),
            Series::new("Low", records.iter().map(|r| r.low).collect::<Vec<f64>>()),
            Series::new("Close", records.iter().map(|r| r.close).collect::<Vec<f64>>()),
            Series::new(
                "Volume",
                records.iter().map(|r| r.volume).collect::<Vec<u64>>(),
            ),
        ])?;
        Ok(df)
    }

    /// The whole history as a DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Self::frame_of(&self.records)
    }

    /// Write the history as CSV
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        Ok(())
    }
}

/// Project price records into training rows.
///
/// Keeps only the date and close of each record, in the same order, one row
/// per record. Fails with [`ForecastError::InsufficientData`] when fewer than
/// [`MIN_TRAINING_ROWS`] records are given.
pub fn reshape(records: &[PriceRecord]) -> Result<Vec<TrainingRow>> {
    if records.len() < MIN_TRAINING_ROWS {
        return Err(ForecastError::InsufficientData(format!(
            "need at least {} rows to fit a forecast, got {}",
            MIN_TRAINING_ROWS,
            records.len()
        )));
    }

    Ok(records
        .iter()
        .map(|r| TrainingRow {
            ds: r.date,
            y: r.close,
        })
        .collect())
}
