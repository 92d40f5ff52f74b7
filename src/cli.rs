use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stock_forecast::utils::{MAX_HORIZON_YEARS, MIN_HORIZON_YEARS};
use stock_forecast::Market;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Forecast one symbol, print its tables and write its charts.
    Forecast(ForecastArgs),

    /// Read `SYMBOL [MARKET] [YEARS]` lines from stdin and forecast each one.
    Interactive(OutputArgs),
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Ticker symbol, e.g. AAPL or RELIANCE.NS
    #[arg(long)]
    pub symbol: String,

    /// Market the symbol trades on (INDIA or US)
    #[arg(long, default_value = "INDIA", value_parser = parse_market)]
    pub market: Market,

    /// Years of prediction
    #[arg(
        long,
        default_value_t = MIN_HORIZON_YEARS,
        value_parser = clap::value_parser!(u32).range(MIN_HORIZON_YEARS as i64..=MAX_HORIZON_YEARS as i64)
    )]
    pub years: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory for charts and CSV files [env: STOCK_FORECAST_OUT_DIR]
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Also write the raw and forecast tables as CSV
    #[arg(long)]
    pub export_csv: bool,

    /// Reuse fetched history for this many hours [env: STOCK_FORECAST_CACHE_TTL_HOURS]
    #[arg(long)]
    pub cache_ttl_hours: Option<u64>,
}

fn parse_market(s: &str) -> Result<Market, String> {
    s.parse().map_err(|e: stock_forecast::ForecastError| e.to_string())
}
