use approx::assert_relative_eq;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use stock_forecast::utils::{
    default_history_start, forecast_accuracy, horizon_days, MAX_HORIZON_YEARS, MIN_HORIZON_YEARS,
};
use stock_forecast::ForecastError;

#[rstest]
#[case(1, 365)]
#[case(2, 730)]
#[case(3, 1095)]
#[case(4, 1460)]
#[case(5, 1825)]
fn test_horizon_days(#[case] years: u32, #[case] expected: usize) {
    assert_eq!(horizon_days(years).unwrap(), expected);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(100)]
fn test_horizon_days_out_of_range(#[case] years: u32) {
    assert!(!(MIN_HORIZON_YEARS..=MAX_HORIZON_YEARS).contains(&years));
    assert!(matches!(
        horizon_days(years),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_default_history_start() {
    assert_eq!(
        default_history_start(),
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
    );
}

#[test]
fn test_forecast_accuracy() {
    let actual = vec![100.0, 102.0, 104.0, 106.0];
    let forecast = vec![101.0, 101.0, 105.0, 106.0];

    let accuracy = forecast_accuracy(&forecast, &actual).unwrap();
    assert_relative_eq!(accuracy.mae, 0.75);
    assert_relative_eq!(accuracy.mse, 0.75);
    assert_relative_eq!(accuracy.rmse, 0.75f64.sqrt());
    assert!(accuracy.mape > 0.0 && accuracy.mape < 1.0);
    assert!(accuracy.smape > 0.0 && accuracy.smape < 1.0);

    let report = accuracy.to_string();
    assert!(report.starts_with("In-sample Fit:"));
    assert!(report.contains("RMSE"));
}

#[test]
fn test_forecast_accuracy_length_mismatch() {
    assert!(forecast_accuracy(&[1.0, 2.0], &[1.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
}
