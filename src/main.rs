mod charts;
mod cli;
mod config;
mod report;
mod session;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::io::{self, BufRead, Write};
use stock_forecast::fetch::YahooFetcher;
use stock_forecast::PipelineInputs;

use crate::cli::{Cli, Commands, OutputArgs};
use crate::config::AppConfig;
use crate::session::{parse_line, Session};

fn preprocess() {
    dotenv::dotenv().ok();
    env_logger::init();
}

fn session(output: &OutputArgs) -> Result<Session<YahooFetcher>> {
    let config = AppConfig::from_env()?
        .with_overrides(output.out_dir.clone(), output.cache_ttl_hours);
    log::debug!("configuration: {config:?}");

    let fetcher = YahooFetcher::new(config.yahoo.clone())?;
    Ok(Session::new(fetcher, &config, output.export_csv))
}

fn interactive(session: &mut Session<YahooFetcher>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Stock Forecast App");
    println!("Enter SYMBOL [INDIA|US] [YEARS 1-5], or 'quit' to exit");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        // a failed run never ends the session
        let result = parse_line(line).and_then(|inputs| session.run(&inputs, Utc::now(), &mut stdout));
        if let Err(e) = result {
            log::debug!("run failed: {e:?}");
            eprintln!("Error: {e:#}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    preprocess();

    let cli = Cli::parse();
    log::info!("Command line input recorded: {cli:?}");

    match cli.command {
        Commands::Forecast(args) => {
            let mut session = session(&args.output)?;
            let inputs = PipelineInputs::new(args.symbol, args.market.to_string(), args.years);
            session.run(&inputs, Utc::now(), &mut io::stdout())?;
        }
        Commands::Interactive(output) => {
            let mut session = session(&output)?;
            interactive(&mut session)?;
        }
    }

    Ok(())
}
