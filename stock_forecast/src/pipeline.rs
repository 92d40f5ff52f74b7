//! End-to-end forecast pipeline
//!
//! One call to [`Pipeline::run`] takes the three user inputs through the
//! whole chain: closing time → window → fetch → reshape → fit → predict.
//! Nothing is carried between runs except the optional history cache.

use crate::cache::{CacheKey, HistoryCache};
use crate::data::{reshape, PriceHistory};
use crate::error::{ForecastError, Result};
use crate::fetch::{HistoryFetcher, Interval};
use crate::market::{Market, MarketClosingSchedule};
use crate::models::{ForecastModel, ForecastTable, SeasonalProfiles, TrainedForecastModel};
use crate::utils::{default_history_start, forecast_accuracy, horizon_days, ForecastAccuracy};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::time::Instant;

/// Raw user inputs, as collected by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInputs {
    /// Ticker symbol, free text
    pub symbol: String,
    /// Market identifier, `INDIA` or `US`
    pub market: String,
    /// Forecast horizon in years
    pub years: u32,
}

impl PipelineInputs {
    /// Bundle the three inputs
    pub fn new(symbol: impl Into<String>, market: impl Into<String>, years: u32) -> Self {
        Self {
            symbol: symbol.into(),
            market: market.into(),
            years,
        }
    }
}

/// Bounds of the historical fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataWindow {
    /// First date requested (inclusive)
    pub start: NaiveDate,
    /// Upper bound (exclusive), in the market's time zone
    pub end: DateTime<Tz>,
}

/// Everything the forecast sections render
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    /// Name of the model that produced the forecast
    pub model_name: String,
    /// Number of training rows the model was fitted on
    pub training_rows: usize,
    /// Future daily periods requested
    pub periods: usize,
    /// History plus future predictions
    pub table: ForecastTable,
    /// Seasonal shapes for the components chart
    pub profiles: SeasonalProfiles,
    /// Fit of the history predictions against the observed closes
    pub accuracy: Option<ForecastAccuracy>,
}

/// Result of a completed run.
///
/// The raw history is always present; the forecast section carries its own
/// error so the raw sections can still be shown when fitting fails.
#[derive(Debug)]
pub struct PipelineReport {
    /// Symbol as entered, trimmed
    pub symbol: String,
    /// Selected market
    pub market: Market,
    /// Horizon in years
    pub years: u32,
    /// Fetch window
    pub window: DataWindow,
    /// Fetched daily prices
    pub history: PriceHistory,
    /// Forecast sections, or why they could not be produced
    pub forecast: Result<ForecastOutput>,
}

/// What a run produced
#[derive(Debug)]
pub enum PipelineOutcome {
    /// No symbol entered yet; nothing was run
    AwaitingInput,
    /// The pipeline ran through the fetch
    Ready(Box<PipelineReport>),
}

/// Forecast pipeline over a history source and a forecasting model
#[derive(Debug)]
pub struct Pipeline<F, M> {
    fetcher: F,
    model: M,
    schedule: MarketClosingSchedule,
    history_start: NaiveDate,
    cache: Option<HistoryCache>,
}

impl<F: HistoryFetcher, M: ForecastModel> Pipeline<F, M> {
    /// Pipeline with the default closing schedule, start date and no cache
    pub fn new(fetcher: F, model: M) -> Self {
        Self {
            fetcher,
            model,
            schedule: MarketClosingSchedule::default(),
            history_start: default_history_start(),
            cache: None,
        }
    }

    /// Replace the closing schedule
    pub fn with_schedule(mut self, schedule: MarketClosingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Replace the first date of every fetch window
    pub fn with_history_start(mut self, start: NaiveDate) -> Self {
        self.history_start = start;
        self
    }

    /// Memoize fetched histories in `cache`
    pub fn with_cache(mut self, cache: HistoryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The history cache, if enabled
    pub fn cache(&self) -> Option<&HistoryCache> {
        self.cache.as_ref()
    }

    /// The closing schedule in use
    pub fn schedule(&self) -> &MarketClosingSchedule {
        &self.schedule
    }

    /// Run the whole pipeline for `inputs` at the instant `now`.
    ///
    /// Returns [`PipelineOutcome::AwaitingInput`] while the symbol is blank.
    /// Market, horizon and fetch failures are returned as errors; reshape and
    /// model failures are reported inside the report's forecast section.
    pub fn run(&mut self, inputs: &PipelineInputs, now: DateTime<Utc>) -> Result<PipelineOutcome> {
        let symbol = inputs.symbol.trim();
        if symbol.is_empty() {
            log::debug!("no symbol entered; waiting for input");
            return Ok(PipelineOutcome::AwaitingInput);
        }

        let market: Market = inputs.market.parse()?;
        let periods = horizon_days(inputs.years)?;
        let end = self.schedule.resolve(market, now)?;
        let window = DataWindow {
            start: self.history_start,
            end,
        };
        log::info!(
            "[{symbol}] {market}: window {} .. {}, horizon {} years ({} days)",
            window.start,
            window.end,
            inputs.years,
            periods
        );

        let history = self.load_history(symbol, market, &window)?;
        if history.is_empty() {
            return Err(ForecastError::EmptyResult(format!(
                "{}: no price rows in the requested window",
                symbol
            )));
        }

        let forecast = self.forecast(&history, periods);
        if let Err(e) = &forecast {
            log::warn!("[{symbol}] forecast unavailable: {e}");
        }

        Ok(PipelineOutcome::Ready(Box::new(PipelineReport {
            symbol: symbol.to_string(),
            market,
            years: inputs.years,
            window,
            history,
            forecast,
        })))
    }

    fn load_history(
        &mut self,
        symbol: &str,
        market: Market,
        window: &DataWindow,
    ) -> Result<PriceHistory> {
        let key = CacheKey::new(symbol, market, window.end.date_naive());
        if let Some(cache) = self.cache.as_mut() {
            if let Some(history) = cache.get(&key, Instant::now()) {
                log::info!("[{symbol}] using cached history ({} rows)", history.len());
                return Ok(history);
            }
        }

        let history = self.fetcher.fetch(
            symbol,
            window.start,
            window.end.with_timezone(&Utc),
            Interval::OneDay,
        )?;

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(key, history.clone(), Instant::now());
        }
        Ok(history)
    }

    /// Reshape, fit and predict `history` extended by `periods` days
    pub fn forecast(&self, history: &PriceHistory, periods: usize) -> Result<ForecastOutput> {
        let rows = reshape(history.records())?;

        let trained = self.model.train(&rows)?;
        let dates = trained.make_future_dates(periods);
        let table = trained.predict(&dates)?;
        log::info!(
            "{}: fitted {} rows, predicted {} rows",
            trained.name(),
            rows.len(),
            table.len()
        );

        let accuracy = in_sample_accuracy(&table, history);

        Ok(ForecastOutput {
            model_name: trained.name().to_string(),
            training_rows: rows.len(),
            periods,
            profiles: trained.seasonal_profiles()?,
            table,
            accuracy,
        })
    }
}

/// Fitted history rows scored against the observed close on the same date
fn in_sample_accuracy(table: &ForecastTable, history: &PriceHistory) -> Option<ForecastAccuracy> {
    let closes: HashMap<NaiveDate, f64> = history
        .records()
        .iter()
        .map(|r| (r.date, r.close))
        .collect();
    let (fitted, actual): (Vec<f64>, Vec<f64>) = table
        .history()
        .iter()
        .filter_map(|row| closes.get(&row.ds).map(|close| (row.yhat, *close)))
        .unzip();

    forecast_accuracy(&fitted, &actual).ok()
}

/// Run the pipeline once with the default schedule and no cache
pub fn run_pipeline<F, M>(
    fetcher: &F,
    model: &M,
    inputs: &PipelineInputs,
    now: DateTime<Utc>,
) -> Result<PipelineOutcome>
where
    F: HistoryFetcher + ?Sized,
    M: ForecastModel,
{
    Pipeline::new(fetcher, model.clone()).run(inputs, now)
}
