use std::io;
use stock_forecast::error::ForecastError;
use trade_math::MathError;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    match ForecastError::from(io_error) {
        ForecastError::IoError(_) => {}
        other => panic!("Expected IoError variant, got {:?}", other),
    }

    let math_error = MathError::CalculationError("matrix is not positive definite".to_string());
    match ForecastError::from(math_error) {
        ForecastError::EngineFailure(msg) => assert!(msg.contains("positive definite")),
        other => panic!("Expected EngineFailure variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    match ForecastError::from(json_error) {
        ForecastError::DataFetchFailed(msg) => assert!(msg.contains("malformed provider response")),
        other => panic!("Expected DataFetchFailed variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::UnknownMarket("'UK' (expected one of INDIA, US)".to_string());
    assert_eq!(
        error.to_string(),
        "Unknown market: 'UK' (expected one of INDIA, US)"
    );

    let error = ForecastError::EmptyResult("ZZZZINVALID: no data found".to_string());
    assert!(error.to_string().starts_with("No data returned"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}
