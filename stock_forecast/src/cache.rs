//! Memoization of fetched price history
//!
//! Entries are keyed on `(symbol, market, window-end date)` and expire after
//! a fixed time-to-live. A pipeline without a cache fetches on every run.

use crate::data::PriceHistory;
use crate::market::Market;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default time-to-live: one trading day
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identity of a cached history
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    symbol: String,
    market: Market,
    window_end: NaiveDate,
}

impl CacheKey {
    /// Key for `symbol` on `market` with a window ending on `window_end`
    pub fn new(symbol: &str, market: Market, window_end: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_ascii_uppercase(),
            market,
            window_end,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    history: PriceHistory,
}

/// Time-bounded store of fetched histories
#[derive(Debug, Clone)]
pub struct HistoryCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl HistoryCache {
    /// Create an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Time-to-live of every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached history for `key` if still fresh at `now`; stale entries are evicted
    pub fn get(&mut self, key: &CacheKey, now: Instant) -> Option<PriceHistory> {
        let fresh = match self.entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.stored_at) < self.ttl,
            None => return None,
        };

        if fresh {
            self.entries.get(key).map(|entry| entry.history.clone())
        } else {
            log::warn!("evicting stale history for {:?}", key);
            self.entries.remove(key);
            None
        }
    }

    /// Store `history` under `key` as of `now`
    pub fn insert(&mut self, key: CacheKey, history: PriceHistory, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                history,
            },
        );
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
