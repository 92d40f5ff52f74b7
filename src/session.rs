//! One forecasting session: a pipeline plus where its output goes

use crate::charts::write_charts;
use crate::config::AppConfig;
use crate::report::{export_csv, print_report};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use stock_forecast::models::prophet::ProphetModel;
use stock_forecast::{HistoryCache, HistoryFetcher, Pipeline, PipelineInputs, PipelineOutcome};

/// Market used when an interactive line names none
pub const DEFAULT_MARKET: &str = "INDIA";

/// Horizon used when an interactive line names none
pub const DEFAULT_YEARS: u32 = 1;

pub struct Session<F> {
    pipeline: Pipeline<F, ProphetModel>,
    out_dir: PathBuf,
    export_csv: bool,
}

impl<F: HistoryFetcher> Session<F> {
    pub fn new(fetcher: F, config: &AppConfig, export_csv: bool) -> Self {
        let mut pipeline = Pipeline::new(fetcher, ProphetModel::new())
            .with_history_start(config.history_start);
        if let Some(ttl) = config.cache_ttl {
            log::info!("history cache enabled, ttl {:?}", ttl);
            pipeline = pipeline.with_cache(HistoryCache::new(ttl));
        }

        Self {
            pipeline,
            out_dir: config.out_dir.clone(),
            export_csv,
        }
    }

    /// Run the pipeline at `now` and write every section of its outcome
    pub fn run<W: Write>(
        &mut self,
        inputs: &PipelineInputs,
        now: DateTime<Utc>,
        out: &mut W,
    ) -> Result<()> {
        let report = match self.pipeline.run(inputs, now)? {
            PipelineOutcome::AwaitingInput => {
                writeln!(out, "Enter a company symbol to load data")?;
                return Ok(());
            }
            PipelineOutcome::Ready(report) => report,
        };

        print_report(&report, out)?;

        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create {}", self.out_dir.display()))?;

        let charts = write_charts(&report, &self.out_dir)?;
        writeln!(out)?;
        writeln!(out, "Charts")?;
        for path in std::iter::once(&charts.raw)
            .chain(charts.forecast.iter())
            .chain(charts.components.iter())
        {
            writeln!(out, "  {}", path.display())?;
        }

        if self.export_csv {
            for path in export_csv(&report, &self.out_dir)? {
                writeln!(out, "  {}", path.display())?;
            }
        }

        Ok(())
    }
}

/// Parse an interactive `SYMBOL [MARKET] [YEARS]` line
pub fn parse_line(line: &str) -> Result<PipelineInputs> {
    let mut tokens = line.split_whitespace();
    let symbol = tokens.next().unwrap_or_default();
    let market = tokens.next().unwrap_or(DEFAULT_MARKET);
    let years = match tokens.next() {
        Some(years) => years
            .parse()
            .with_context(|| format!("years must be a whole number, got '{years}'"))?,
        None => DEFAULT_YEARS,
    };
    if let Some(extra) = tokens.next() {
        bail!("unexpected '{extra}', expected SYMBOL [MARKET] [YEARS]");
    }

    Ok(PipelineInputs::new(symbol, market, years))
}
