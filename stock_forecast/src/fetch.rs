//! Historical price retrieval
//!
//! The pipeline only depends on the [`HistoryFetcher`] trait; the Yahoo
//! Finance chart API client lives in [`yahoo`].

use crate::data::PriceHistory;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

pub mod yahoo;

pub use yahoo::{YahooConfig, YahooFetcher};

/// Bar interval requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    /// One bar per trading day
    #[default]
    OneDay,
}

impl Interval {
    /// Interval as the provider spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneDay => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of daily price history
pub trait HistoryFetcher {
    /// Fetch bars for `symbol` from `start` (inclusive) up to `end` (exclusive).
    ///
    /// Implementations return [`ForecastError::EmptyResult`] when the
    /// provider has no rows for the symbol and
    /// [`ForecastError::DataFetchFailed`] on transport or decoding failures.
    ///
    /// [`ForecastError::EmptyResult`]: crate::ForecastError::EmptyResult
    /// [`ForecastError::DataFetchFailed`]: crate::ForecastError::DataFetchFailed
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<PriceHistory>;
}

impl<F: HistoryFetcher + ?Sized> HistoryFetcher for &F {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<PriceHistory> {
        (**self).fetch(symbol, start, end, interval)
    }
}

impl<F: HistoryFetcher + ?Sized> HistoryFetcher for Box<F> {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<PriceHistory> {
        (**self).fetch(symbol, start, end, interval)
    }
}
