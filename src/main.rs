use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, Parser};
use tracing::debug;

use std::{path::PathBuf, process::ExitCode};

use orders::Error;

/// Splits a sales-order CSV export into one formatted spreadsheet per order.
///
/// Spreadsheets are written to an `Orders_YYYY-MM-DD` directory next to the
/// CSV file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the sales data CSV file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    sales_csv: PathBuf,

    /// Date to use in the output directory name [default: today]
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let err = Error::Usage(usage_message(&err));
            eprintln!("Error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .init();
    debug!(?cli, "starting");

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    match orders::run(&cli.sales_csv, date) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Boils a clap error down to one line.
fn usage_message(err: &clap::Error) -> String {
    let detail = match err.kind() {
        ErrorKind::MissingRequiredArgument => {
            "provide the path to the sales data CSV file".to_string()
        }
        _ => err
            .render()
            .to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string(),
    };
    format!("{detail} (see --help)")
}
