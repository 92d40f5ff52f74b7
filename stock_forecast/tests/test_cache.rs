use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use stock_forecast::cache::{CacheKey, HistoryCache, DEFAULT_TTL};
use stock_forecast::data::{PriceHistory, PriceRecord};
use stock_forecast::Market;

fn window_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn history(symbol: &str) -> PriceHistory {
    PriceHistory::new(
        symbol,
        vec![PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            open: 10.0,
            high: 11.0,
            low: 9.5,
            close: 10.5,
            volume: 42,
        }],
    )
}

#[test]
fn test_default_ttl_is_one_day() {
    let cache = HistoryCache::default();
    assert_eq!(cache.ttl(), DEFAULT_TTL);
    assert_eq!(cache.ttl(), Duration::from_secs(86_400));
    assert!(cache.is_empty());
}

#[test]
fn test_hit_within_ttl() {
    let mut cache = HistoryCache::new(Duration::from_secs(60));
    let now = Instant::now();
    let key = CacheKey::new("AAPL", Market::Us, window_end());

    cache.insert(key.clone(), history("AAPL"), now);
    let hit = cache.get(&key, now + Duration::from_secs(59)).unwrap();

    assert_eq!(hit, history("AAPL"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_stale_entry_is_evicted() {
    let mut cache = HistoryCache::new(Duration::from_secs(60));
    let now = Instant::now();
    let key = CacheKey::new("AAPL", Market::Us, window_end());

    cache.insert(key.clone(), history("AAPL"), now);
    assert!(cache.get(&key, now + Duration::from_secs(60)).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_key_normalizes_symbol() {
    assert_eq!(
        CacheKey::new(" aapl ", Market::Us, window_end()),
        CacheKey::new("AAPL", Market::Us, window_end())
    );
}

#[test]
fn test_key_separates_market_and_window() {
    let mut cache = HistoryCache::default();
    let now = Instant::now();
    cache.insert(
        CacheKey::new("TCS", Market::India, window_end()),
        history("TCS"),
        now,
    );

    assert!(cache
        .get(&CacheKey::new("TCS", Market::Us, window_end()), now)
        .is_none());
    let next_day = window_end().succ_opt().unwrap();
    assert!(cache
        .get(&CacheKey::new("TCS", Market::India, next_day), now)
        .is_none());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
