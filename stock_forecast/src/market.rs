//! Markets and their daily closing times
//!
//! The closing time decides where the historical window ends: before the
//! close the window stops at today's close, at or after the close it moves
//! to tomorrow's close so that today's completed session is included.
//!
//! Closing times are wall-clock times in the exchange's own time zone, and
//! the current instant is converted into that zone before comparing.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A supported stock market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// National Stock Exchange / BSE
    India,
    /// NYSE / NASDAQ
    Us,
}

impl Market {
    /// Every supported market
    pub const ALL: [Market; 2] = [Market::India, Market::Us];

    /// Canonical upper-case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::India => "INDIA",
            Market::Us => "US",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INDIA" => Ok(Market::India),
            "US" => Ok(Market::Us),
            other => Err(ForecastError::UnknownMarket(format!(
                "'{}' (expected one of INDIA, US)",
                other
            ))),
        }
    }
}

/// Fixed daily closing wall-clock time of a market, in its exchange time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingTime {
    time: NaiveTime,
    timezone: Tz,
}

impl ClosingTime {
    /// Create a closing time at `hour:minute` in `timezone`
    pub fn new(hour: u32, minute: u32, timezone: Tz) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Invalid closing time {:02}:{:02}",
                hour, minute
            ))
        })?;

        Ok(Self { time, timezone })
    }

    // hour and minute are known to be in range
    fn at(hour: u32, minute: u32, timezone: Tz) -> Self {
        let minutes = i64::from(hour * 60 + minute);
        Self {
            time: NaiveTime::MIN + Duration::minutes(minutes),
            timezone,
        }
    }

    /// Wall-clock closing time
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Exchange time zone the wall-clock time is expressed in
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// Closing time per market, built once per run
#[derive(Debug, Clone)]
pub struct MarketClosingSchedule {
    entries: HashMap<Market, ClosingTime>,
}

impl Default for MarketClosingSchedule {
    fn default() -> Self {
        let mut entries = HashMap::with_capacity(Market::ALL.len());
        entries.insert(
            Market::India,
            ClosingTime::at(15, 30, chrono_tz::Asia::Kolkata),
        );
        entries.insert(
            Market::Us,
            ClosingTime::at(16, 0, chrono_tz::America::New_York),
        );
        Self { entries }
    }
}

impl MarketClosingSchedule {
    /// A schedule with no markets
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Set (or replace) the closing time of a market
    pub fn with_closing(mut self, market: Market, closing: ClosingTime) -> Self {
        self.entries.insert(market, closing);
        self
    }

    /// Whether every supported market has exactly one entry
    pub fn is_complete(&self) -> bool {
        Market::ALL.iter().all(|m| self.entries.contains_key(m))
    }

    /// Closing time of `market`
    pub fn closing_time(&self, market: Market) -> Result<&ClosingTime> {
        self.entries.get(&market).ok_or_else(|| {
            ForecastError::UnknownMarket(format!("no closing time scheduled for {}", market))
        })
    }

    /// Window end for a wall-clock `now` already expressed in the market's zone.
    ///
    /// Returns today's closing time while the market is open, and tomorrow's
    /// (same hour and minute) once `now` has reached the close.
    pub fn resolve_local(&self, market: Market, now: NaiveDateTime) -> Result<NaiveDateTime> {
        let closing = self.closing_time(market)?;
        let today_close = now.date().and_time(closing.time());

        if now >= today_close {
            today_close.checked_add_days(Days::new(1)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!("date overflow after {}", today_close))
            })
        } else {
            Ok(today_close)
        }
    }

    /// Window end for the instant `now`, as a timestamp in the market's zone
    pub fn resolve(&self, market: Market, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let tz = self.closing_time(market)?.timezone();
        let local_now = now.with_timezone(&tz).naive_local();
        let end = self.resolve_local(market, local_now)?;

        tz.from_local_datetime(&end).earliest().ok_or_else(|| {
            ForecastError::InvalidParameter(format!("{} does not exist in {}", end, tz))
        })
    }

    /// Parse the market identifier, then [`resolve`](Self::resolve)
    pub fn resolve_str(&self, market: &str, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        self.resolve(market.parse()?, now)
    }
}
