//! Fxsync CLI
//!
//! Command-line interface for the fixing rate API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use fxsync_client::FxsyncClient;
use fxsync_types::parse_iso_date;

#[derive(Parser)]
#[command(name = "fxsync")]
#[command(author, version, about = "Fixing rate API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the fixing rate API
    #[arg(long, env = "FXSYNC_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull rates from the upstream feed
    Sync {
        #[command(subcommand)]
        action: SyncCommands,
    },
    /// Min/max/average rate per currency over a date range
    Report {
        /// First date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
        /// Currency codes (comma-separated, e.g. USD,EUR)
        #[arg(value_delimiter = ',', required = true)]
        codes: Vec<String>,
    },
    /// List every stored rate
    Rates,
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum SyncCommands {
    /// Sync a single date
    Day {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Sync every date in an inclusive range
    Range {
        /// First date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_iso_date(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxsyncClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Sync { action } => match action {
            SyncCommands::Day { date } => {
                let summary = client.sync_day(date).await?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
                if summary.is_failed() {
                    std::process::exit(1);
                }
            }
            SyncCommands::Range { start, end } => {
                let response = client.sync_range(start, end).await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        },

        Commands::Report { start, end, codes } => {
            let report = client.report(start, end, &codes).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Rates => {
            let rates = client.rates().await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_codes() {
        let cli = Cli::try_parse_from(["fxsync", "report", "2024-01-01", "2024-01-31", "USD,EUR"])
            .unwrap();
        match cli.command {
            Commands::Report { start, codes, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(codes, vec!["USD", "EUR"]);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["fxsync", "sync", "day", "01.02.2024"]).is_err());
    }
}
