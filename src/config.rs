//! Runtime configuration from the environment (after `.env` is loaded)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use stock_forecast::fetch::YahooConfig;
use stock_forecast::utils::default_history_start;

pub const START_VAR: &str = "STOCK_FORECAST_START";
pub const BASE_URL_VAR: &str = "STOCK_FORECAST_BASE_URL";
pub const USER_AGENT_VAR: &str = "STOCK_FORECAST_USER_AGENT";
pub const TIMEOUT_VAR: &str = "STOCK_FORECAST_TIMEOUT_SECS";
pub const OUT_DIR_VAR: &str = "STOCK_FORECAST_OUT_DIR";
pub const CACHE_TTL_VAR: &str = "STOCK_FORECAST_CACHE_TTL_HOURS";

const DEFAULT_OUT_DIR: &str = "charts";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// First date of every history window
    pub history_start: NaiveDate,
    /// Yahoo client settings
    pub yahoo: YahooConfig,
    /// Where charts and CSV files go
    pub out_dir: PathBuf,
    /// History cache lifetime; `None` disables the cache
    pub cache_ttl: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_start: default_history_start(),
            yahoo: YahooConfig::default(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            cache_ttl: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(start) = get(START_VAR) {
            config.history_start = start
                .trim()
                .parse()
                .with_context(|| format!("{START_VAR} must be a YYYY-MM-DD date, got '{start}'"))?;
        }
        if let Some(url) = get(BASE_URL_VAR) {
            config.yahoo.base_url = url;
        }
        if let Some(agent) = get(USER_AGENT_VAR) {
            config.yahoo.user_agent = agent;
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds"))?;
            config.yahoo.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get(OUT_DIR_VAR) {
            config.out_dir = PathBuf::from(dir);
        }
        if let Some(hours) = get(CACHE_TTL_VAR) {
            let hours: u64 = hours
                .trim()
                .parse()
                .with_context(|| format!("{CACHE_TTL_VAR} must be a whole number of hours"))?;
            config.cache_ttl = ttl_from_hours(hours);
        }

        Ok(config)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, out_dir: Option<PathBuf>, cache_ttl_hours: Option<u64>) -> Self {
        if let Some(dir) = out_dir {
            self.out_dir = dir;
        }
        if let Some(hours) = cache_ttl_hours {
            self.cache_ttl = ttl_from_hours(hours);
        }
        self
    }
}

// zero hours means no cache
fn ttl_from_hours(hours: u64) -> Option<Duration> {
    (hours > 0).then(|| Duration::from_secs(hours * 60 * 60))
}
