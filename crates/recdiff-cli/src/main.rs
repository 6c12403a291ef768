//! recdiff CLI
//!
//! Command-line interface for comparing two keyed record sources

use clap::{Parser, Subcommand, ValueEnum};
use recdiff_core::logging_facility::{init, Profile};

mod commands;

/// Exit code for a diff that ran but could not produce a result
const EXIT_ABORTED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "recdiff")]
#[command(about = "recdiff - Compare two keyed record collections", long_about = None)]
struct Cli {
    /// Emit diagnostics to stderr in this format
    #[arg(long, global = true, value_enum)]
    log: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable, debug level
    Pretty,
    /// JSON lines, info level
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Diff two sources using a config file
    Diff(commands::diff::DiffArgs),
    /// Validate a delta rule and optionally evaluate it
    CheckDelta(commands::check_delta::CheckDeltaArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        Some(LogFormat::Pretty) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::CheckDelta(args) => commands::check_delta::execute(args),
    };

    match result {
        Ok(commands::Status::Complete) => {}
        Ok(commands::Status::Aborted) => std::process::exit(EXIT_ABORTED),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
