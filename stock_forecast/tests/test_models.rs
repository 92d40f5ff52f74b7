use approx::assert_relative_eq;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use rstest::rstest;
use stock_forecast::data::TrainingRow;
use stock_forecast::models::prophet::ProphetModel;
use stock_forecast::models::{ForecastModel, ForecastTable, TrainedForecastModel};
use stock_forecast::utils::forecast_accuracy;
use stock_forecast::ForecastError;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

/// Daily rows on a rising line with a small deterministic wiggle
fn create_trending_rows(n: usize) -> Vec<TrainingRow> {
    (0..n)
        .map(|i| TrainingRow {
            ds: start_date() + Days::new(i as u64),
            y: 50.0 + 0.1 * i as f64 + 0.5 * (i as f64 * 1.3).sin(),
        })
        .collect()
}

/// Weekday-only rows, like an exchange calendar
fn create_trading_day_rows(n: usize) -> Vec<TrainingRow> {
    let mut rows = Vec::with_capacity(n);
    let mut day = start_date();
    while rows.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let i = rows.len() as f64;
            rows.push(TrainingRow {
                ds: day,
                y: 120.0 + 0.05 * i + 3.0 * (i / 40.0).sin(),
            });
        }
        day = day + Days::new(1);
    }
    rows
}

fn forecast(rows: &[TrainingRow], periods: usize) -> ForecastTable {
    let trained = ProphetModel::new().train(rows).unwrap();
    trained.predict(&trained.make_future_dates(periods)).unwrap()
}

#[rstest]
#[case(30, 365)]
#[case(500, 365)]
#[case(500, 1825)]
fn test_forecast_covers_history_and_future(#[case] n: usize, #[case] periods: usize) {
    let rows = create_trading_day_rows(n);
    let trained = ProphetModel::new().train(&rows).unwrap();

    let dates = trained.make_future_dates(periods);
    assert_eq!(dates.len(), n + periods);

    let table = trained.predict(&dates).unwrap();
    assert_eq!(table.len(), n + periods);
    assert_eq!(table.history_len(), n);
    assert_eq!(table.future().len(), periods);

    let last_history = rows.last().unwrap().ds;
    assert_eq!(
        table.rows().last().unwrap().ds,
        last_history + Days::new(periods as u64)
    );
    assert!(table.rows().windows(2).all(|w| w[0].ds < w[1].ds));
}

#[test]
fn test_rows_are_finite_and_bracketed() {
    let table = forecast(&create_trading_day_rows(500), 730);

    for row in table.rows() {
        assert!(row.yhat.is_finite() && row.trend.is_finite(), "{:?}", row);
        assert!(row.yhat_lower <= row.yhat, "{:?}", row);
        assert!(row.yhat <= row.yhat_upper, "{:?}", row);
    }
}

#[test]
fn test_components_add_up() {
    let table = forecast(&create_trending_rows(800), 90);

    for row in table.rows() {
        assert_relative_eq!(
            row.yhat,
            row.trend + row.weekly + row.yearly,
            max_relative = 1e-6
        );
    }
}

#[test]
fn test_trend_recovery() {
    let n = 400;
    let rows = create_trending_rows(n);
    let table = forecast(&rows, 90);

    let last = table.rows().last().unwrap();
    let expected = 50.0 + 0.1 * (n - 1 + 90) as f64;
    assert_relative_eq!(last.yhat, expected, max_relative = 0.1);

    // in-sample fit tracks the observations
    let fitted: Vec<f64> = table.history().iter().map(|r| r.yhat).collect();
    let actual: Vec<f64> = rows.iter().map(|r| r.y).collect();
    let accuracy = forecast_accuracy(&fitted, &actual).unwrap();
    assert!(accuracy.mae < 1.0, "mae = {}", accuracy.mae);
}

#[test]
fn test_seasonal_profiles() {
    let trained = ProphetModel::new()
        .train(&create_trending_rows(800))
        .unwrap();
    let profiles = trained.seasonal_profiles().unwrap();

    let weekly = profiles.weekly.unwrap();
    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[0].0, Weekday::Sun);
    assert_eq!(weekly[6].0, Weekday::Sat);

    let yearly = profiles.yearly.unwrap();
    assert_eq!(yearly.len(), 365);
    assert_eq!(yearly[0].0.ordinal(), 1);
}

#[test]
fn test_short_history_has_no_yearly_component() {
    // about 9 months of daily data
    let trained = ProphetModel::new()
        .train(&create_trending_rows(280))
        .unwrap();
    let profiles = trained.seasonal_profiles().unwrap();
    assert!(profiles.weekly.is_some());
    assert!(profiles.yearly.is_none());

    let table = trained.predict(&trained.make_future_dates(30)).unwrap();
    assert!(table.rows().iter().all(|r| r.yearly == 0.0));
}

#[test]
fn test_train_sorts_and_dedupes_rows() {
    let mut rows = create_trending_rows(50);
    rows.reverse();
    rows.push(TrainingRow {
        ds: start_date(),
        y: 51.0,
    });

    let trained = ProphetModel::new().train(&rows).unwrap();
    let dates = trained.history_dates();
    assert_eq!(dates.len(), 50);
    assert_eq!(dates[0], start_date());
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_train_errors() {
    let model = ProphetModel::new();

    let one = create_trending_rows(1);
    assert!(matches!(
        model.train(&one),
        Err(ForecastError::EngineFailure(_))
    ));

    let mut bad = create_trending_rows(20);
    bad[5].y = f64::NAN;
    assert!(matches!(
        model.train(&bad),
        Err(ForecastError::EngineFailure(_))
    ));

    let same_day = vec![
        TrainingRow {
            ds: start_date(),
            y: 1.0,
        },
        TrainingRow {
            ds: start_date(),
            y: 2.0,
        },
    ];
    assert!(matches!(
        model.train(&same_day),
        Err(ForecastError::EngineFailure(_))
    ));
}

#[test]
fn test_forecast_table_dataframe_and_csv() {
    let table = forecast(&create_trending_rows(60), 10);

    let df = table.to_dataframe().unwrap();
    assert_eq!(df.height(), 70);
    assert_eq!(
        df.get_column_names(),
        vec!["ds", "trend", "weekly", "yearly", "yhat", "yhat_lower", "yhat_upper"]
    );
    assert_eq!(table.tail(5).len(), 5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    table.write_csv(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 71);
}

#[test]
fn test_forecast_table_rejects_long_history() {
    let result = ForecastTable::new(Vec::new(), 1);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}
