use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use stock_forecast::data::{reshape, PriceHistory, PriceRecord, MIN_TRAINING_ROWS};
use stock_forecast::ForecastError;
use tempfile::tempdir;

fn create_test_records(n: usize) -> Vec<PriceRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64;
            PriceRecord {
                date: start + Days::new(i as u64),
                open: base,
                high: base + 2.0,
                low: base - 1.0,
                close: base + 0.5,
                volume: 1000 + i as u64,
            }
        })
        .collect()
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(250)]
fn test_reshape_keeps_date_and_close(#[case] n: usize) {
    let records = create_test_records(n);
    let rows = reshape(&records).unwrap();

    assert_eq!(rows.len(), records.len());
    for (row, record) in rows.iter().zip(records.iter()) {
        assert_eq!(row.ds, record.date);
        assert_eq!(row.y, record.close);
    }
}

#[rstest]
#[case(0)]
#[case(1)]
fn test_reshape_too_few_rows(#[case] n: usize) {
    assert!(n < MIN_TRAINING_ROWS);
    let result = reshape(&create_test_records(n));
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_price_history_accessors() {
    let history = PriceHistory::new("AAPL", create_test_records(10));

    assert_eq!(history.symbol(), "AAPL");
    assert_eq!(history.len(), 10);
    assert!(!history.is_empty());
    assert_eq!(history.tail(5).len(), 5);
    assert_eq!(history.tail(5)[0].date, NaiveDate::from_ymd_opt(2023, 1, 7).unwrap());
    assert_eq!(history.tail(50).len(), 10);
    assert_eq!(history.records()[0].open, 100.0);
    assert_eq!(history.records()[9].close, 109.5);

    let (first, last) = history.date_range().unwrap();
    assert_eq!(first, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    assert_eq!(last, NaiveDate::from_ymd_opt(2023, 1, 11).unwrap());

    assert!(PriceHistory::default().date_range().is_none());
}

#[test]
fn test_price_history_dataframe() {
    let history = PriceHistory::new("AAPL", create_test_records(7));
    let df = history.to_dataframe().unwrap();

    assert_eq!(df.height(), 7);
    assert_eq!(
        df.get_column_names(),
        vec!["Date", "Open", "High", "Low", "Close", "Volume"]
    );

    let tail = PriceHistory::frame_of(history.tail(5)).unwrap();
    assert_eq!(tail.height(), 5);
}

#[test]
fn test_price_history_write_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.csv");

    let history = PriceHistory::new("AAPL", create_test_records(3));
    history.write_csv(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), "Date,Open,High,Low,Close,Volume");
    assert!(lines.next().unwrap().starts_with("2023-01-02,"));
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn test_write_csv_to_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("history.csv");

    let history = PriceHistory::new("AAPL", create_test_records(3));
    let result = history.write_csv(&path);
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}
