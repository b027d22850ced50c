//! Convert CSV exports into idempotent SQL insert scripts.
//!
//! `convert` (the default) reads `<table>_rows.csv` exports from one directory
//! and writes `<table>_inserts.sql` scripts. `locate` only reports where
//! exports can be found.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use csv_inserts::config::{DriverConfig, ImportSettings};
use csv_inserts::driver::{
    convert, locate_exports, render_banner, render_convert_summary, render_locate_report,
    render_no_inputs,
};
use csv_inserts::{ConfigError, DriverError};

/// `csv-inserts` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "csv-inserts",
    about = "Generate idempotent SQL insert scripts from storage and migration CSV exports",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Convert every export found in the input directory.
    Convert(ConvertArgs),
    /// Search candidate directories for exports without converting them.
    Locate(LocateArgs),
}

#[derive(Debug, Clone, Default, Args)]
struct ConvertArgs {
    /// Directory holding the `*_rows.csv` exports.
    #[arg(long = "input-dir", value_name = "dir")]
    input_dir: Option<Utf8PathBuf>,
    /// Directory receiving the `*_inserts.sql` scripts.
    #[arg(long = "output-dir", value_name = "dir")]
    output_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
struct LocateArgs {
    /// Directory to search; repeat to search several, in priority order.
    #[arg(long = "search-dir", value_name = "dir")]
    search_dirs: Vec<Utf8PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            write_stderr(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode, CliError> {
    let settings = ImportSettings::load_without_args()?;
    let mut config = DriverConfig::from_settings(&settings)?;
    match args.command.unwrap_or_else(|| Command::Convert(ConvertArgs::default())) {
        Command::Convert(overrides) => {
            if let Some(dir) = overrides.input_dir {
                config.input_dir = dir;
            }
            if let Some(dir) = overrides.output_dir {
                config.output_dir = dir;
            }
            run_convert(&config)
        }
        Command::Locate(overrides) => {
            if !overrides.search_dirs.is_empty() {
                config.search_dirs = overrides.search_dirs;
            }
            run_locate(&config)
        }
    }
}

fn run_convert(config: &DriverConfig) -> Result<ExitCode, CliError> {
    write_stdout(&render_banner("CSV TO SQL INSERT CONVERTER"));
    match convert(config) {
        Ok(summary) => {
            write_stdout(&render_convert_summary(&summary));
            summary.ensure_complete()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(DriverError::NoInputFiles { searched }) => {
            write_stdout(&render_no_inputs(&searched, &config.tables));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn run_locate(config: &DriverConfig) -> Result<ExitCode, CliError> {
    write_stdout(&render_banner("LOCATING CSV EXPORTS"));
    match locate_exports(config) {
        Ok(report) => {
            write_stdout(&render_locate_report(&report, &config.input_dir));
            Ok(ExitCode::SUCCESS)
        }
        Err(DriverError::NoInputFiles { searched }) => {
            write_stdout(&render_no_inputs(&searched, &config.tables));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn write_stdout(text: &str) {
    if let Err(err) = write!(io::stdout().lock(), "{text}") {
        drop(err);
    }
}

fn write_stderr(message: &str) {
    if let Err(err) = writeln!(io::stderr().lock(), "{message}") {
        drop(err);
    }
}
