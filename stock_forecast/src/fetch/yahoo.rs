//! Yahoo Finance chart API client
//!
//! `GET {base}/v8/finance/chart/{symbol}?period1=..&period2=..&interval=1d`

use super::{HistoryFetcher, Interval};
use crate::data::{PriceHistory, PriceRecord};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use chrono_tz::Tz;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the Yahoo chart API
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Scheme and host, e.g. `https://query1.finance.yahoo.com`
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (compatible; stock-forecast/0.1)".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking Yahoo Finance history fetcher
#[derive(Debug, Clone)]
pub struct YahooFetcher {
    client: Client,
    config: YahooConfig,
}

impl YahooFetcher {
    /// Build a fetcher with its own HTTP client
    pub fn new(config: YahooConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Settings this fetcher was built with
    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Full chart URL for a request
    pub fn chart_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ForecastError::InvalidParameter(format!(
                "invalid base url '{}': {}",
                self.config.base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ForecastError::InvalidParameter(format!(
                    "base url '{}' cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &end.timestamp().to_string())
            .append_pair("interval", interval.as_str())
            .append_pair("events", "history");

        Ok(url)
    }
}

impl HistoryFetcher for YahooFetcher {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<PriceHistory> {
        let symbol = symbol.trim();
        if start.and_time(NaiveTime::MIN).and_utc() >= end {
            return Err(ForecastError::InvalidParameter(format!(
                "window start {} is not before window end {}",
                start, end
            )));
        }

        let url = self.chart_url(symbol, start, end, interval)?;
        log::debug!("[{symbol}] GET {url}");

        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.text()?;
        log::debug!("[{symbol}] HTTP {status}, {} bytes", body.len());

        let records = match decode_chart(symbol, &body) {
            Ok(records) => records,
            // a non-JSON error page says more through its status than its body
            Err(ForecastError::DataFetchFailed(_)) if !status.is_success() => {
                return Err(ForecastError::DataFetchFailed(format!(
                    "{} returned HTTP {}",
                    symbol, status
                )))
            }
            Err(e) => return Err(e),
        };

        log::info!("[{symbol}] fetched {} daily rows", records.len());
        Ok(PriceHistory::new(symbol, records))
    }
}

/// Decode a chart API payload into price records.
///
/// Rows with a missing open, high, low or close are dropped. Dates are taken
/// in the exchange's time zone; rows are sorted by date and a repeated date
/// keeps its last row.
pub fn decode_chart(symbol: &str, body: &str) -> Result<Vec<PriceRecord>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        let message = format!("{}: {}", symbol, err.description);
        return Err(if err.code.eq_ignore_ascii_case("Not Found") {
            ForecastError::EmptyResult(message)
        } else {
            ForecastError::DataFetchFailed(format!("{} ({})", message, err.code))
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ForecastError::EmptyResult(format!("{}: no chart result", symbol)))?;

    let clock = ExchangeClock::from_meta(&result.meta);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut records = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let row = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
            clock.date_of(ts),
        );
        match row {
            (Some(open), Some(high), Some(low), Some(close), Some(date)) => {
                records.push(PriceRecord {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
                });
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("[{symbol}] dropped {dropped} rows with missing prices");
    }

    records.sort_by_key(|r| r.date);
    let mut deduped: Vec<PriceRecord> = Vec::with_capacity(records.len());
    for record in records {
        match deduped.last_mut() {
            Some(last) if last.date == record.date => *last = record,
            _ => deduped.push(record),
        }
    }

    if deduped.is_empty() {
        return Err(ForecastError::EmptyResult(format!(
            "{}: no price rows in the requested window",
            symbol
        )));
    }

    Ok(deduped)
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

enum ExchangeClock {
    Named(Tz),
    Offset(FixedOffset),
}

impl ExchangeClock {
    fn from_meta(meta: &ChartMeta) -> Self {
        if let Some(tz) = meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return ExchangeClock::Named(tz);
        }

        let offset = meta
            .gmtoffset
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        ExchangeClock::Offset(offset)
    }

    fn date_of(&self, timestamp: i64) -> Option<NaiveDate> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            ExchangeClock::Named(tz) => utc.with_timezone(tz).date_naive(),
            ExchangeClock::Offset(offset) => utc.with_timezone(offset).date_naive(),
        })
    }
}

// `chart` payload schema
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
    #[serde(rename = "gmtoffset")]
    gmtoffset: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}
