//! Diff command
//!
//! Usage: recdiff diff --config <FILE> <OLD> <NEW> [--table <T>]
//!        [--old-table <T>] [--new-table <T>] [--only-missing] [--allow-dup]
//!        [--format json|summary|report] [--output <FILE>]

use super::{CommandResult, Status};
use clap::{Args, ValueEnum};
use recdiff_core::{
    render_human_summary, DiffOptions, DiffOutcome, Differ, ExError, RunContext,
};
use recdiff_store::{load_config, open_source};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Differ config file (.yaml, .yml, .toml or .json)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Baseline source
    pub old: PathBuf,

    /// Candidate source
    pub new: PathBuf,

    /// Table for both sources when they are SQLite databases
    #[arg(long)]
    pub table: Option<String>,

    /// Table for the old source, overriding --table
    #[arg(long)]
    pub old_table: Option<String>,

    /// Table for the new source, overriding --table
    #[arg(long)]
    pub new_table: Option<String>,

    /// Report only keys missing from the new source
    #[arg(long)]
    pub only_missing: bool,

    /// Allow a key to repeat within a source (last record wins)
    #[arg(long)]
    pub allow_dup: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The `missing` / `additional` / `different` mapping
    Json,
    /// Markdown summary
    Summary,
    /// JSON envelope with run metadata around the mapping
    Report,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> CommandResult {
    let config = load_config(&args.config)?;
    let differ = Differ::new(config)?;

    let old_table = args.old_table.as_deref().or(args.table.as_deref());
    let new_table = args.new_table.as_deref().or(args.table.as_deref());
    let old = open_source(&args.old, old_table)?;
    let new = open_source(&args.new, new_table)?;

    let options = DiffOptions::default()
        .only_missing(args.only_missing)
        .allow_duplicates(args.allow_dup);
    let ctx = RunContext::new();
    let outcome = differ.diff_in_context(&ctx, old.as_ref(), new.as_ref(), options)?;

    let rendered = render(&ctx, &args, &outcome)?;
    write_output(args.output.as_deref(), &rendered)?;

    match outcome.abort_reason() {
        Some(reason) => {
            eprintln!("Diff aborted: {}", reason);
            Ok(Status::Aborted)
        }
        None => Ok(Status::Complete),
    }
}

fn render(ctx: &RunContext, args: &DiffArgs, outcome: &DiffOutcome) -> Result<String, ExError> {
    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome.to_value())?,
        OutputFormat::Summary => render_human_summary(outcome),
        OutputFormat::Report => serde_json::to_string_pretty(&report(ctx, args, outcome)?)?,
    };
    Ok(rendered)
}

fn report(
    ctx: &RunContext,
    args: &DiffArgs,
    outcome: &DiffOutcome,
) -> Result<Value, serde_json::Error> {
    let abort = outcome.abort_reason().map(serde_json::to_value).transpose()?;
    Ok(json!({
        "run_id": ctx.run_id.as_str(),
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "old": args.old.display().to_string(),
        "new": args.new.display().to_string(),
        "only_missing": args.only_missing,
        "status": if outcome.is_complete() { "complete" } else { "aborted" },
        "abort": abort,
        "result": outcome.to_value(),
    }))
}

fn write_output(path: Option<&Path>, rendered: &str) -> std::io::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))?;
            tracing::debug!(
                component = module_path!(),
                op = "diff",
                path = %path.display(),
                "diff written"
            );
            Ok(())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}
