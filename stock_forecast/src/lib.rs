//! # Stock Forecast
//!
//! Daily stock price forecasting from Yahoo Finance history.
//!
//! ## Features
//!
//! - Market closing-time resolution (INDIA, US) in the exchange's own time zone
//! - Daily OHLCV history fetching over HTTP, behind the [`HistoryFetcher`] trait
//! - Reshaping of price history into `{ds, y}` training rows
//! - Prophet forecasting (trend, yearly/weekly seasonality, uncertainty bounds)
//!   through `augurs`
//! - A single-call [`Pipeline`] tying the steps together, with an optional
//!   history cache
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use stock_forecast::fetch::{YahooConfig, YahooFetcher};
//! use stock_forecast::models::prophet::ProphetModel;
//! use stock_forecast::pipeline::{Pipeline, PipelineInputs, PipelineOutcome};
//!
//! let fetcher = YahooFetcher::new(YahooConfig::default())?;
//! let mut pipeline = Pipeline::new(fetcher, ProphetModel::new());
//!
//! let inputs = PipelineInputs::new("AAPL", "US", 2);
//! if let PipelineOutcome::Ready(report) = pipeline.run(&inputs, Utc::now())? {
//!     println!("{} rows fetched", report.history.len());
//!     if let Ok(output) = &report.forecast {
//!         println!("{} rows forecast", output.table.len());
//!     }
//! }
//! # Ok::<(), stock_forecast::ForecastError>(())
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod fetch;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::cache::{CacheKey, HistoryCache};
pub use crate::data::{reshape, PriceHistory, PriceRecord, TrainingRow};
pub use crate::error::{ForecastError, Result};
pub use crate::fetch::{HistoryFetcher, Interval};
pub use crate::market::{Market, MarketClosingSchedule};
pub use crate::models::{ForecastModel, ForecastRow, ForecastTable, TrainedForecastModel};
pub use crate::pipeline::{run_pipeline, Pipeline, PipelineInputs, PipelineOutcome, PipelineReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
