//! Error types for the stock_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the stock_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Market identifier outside the supported set, or missing from a schedule
    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    /// Network, HTTP or payload decoding failure while fetching history
    #[error("Data fetch failed: {0}")]
    DataFetchFailed(String),

    /// The provider answered but returned no usable rows
    #[error("No data returned: {0}")]
    EmptyResult(String),

    /// Too few rows to fit a forecast
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The forecasting engine failed during fit or predict
    #[error("Forecast engine failure: {0}")]
    EngineFailure(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::EngineFailure(err.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::DataFetchFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::DataFetchFailed(format!("malformed provider response: {}", err))
    }
}
