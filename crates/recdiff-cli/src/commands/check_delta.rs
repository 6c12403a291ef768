//! Check-delta command
//!
//! Usage: recdiff check-delta <EXPR> [--old <V> --new <V>]

use super::{CommandResult, Status};
use clap::Args;
use recdiff_core::{DeltaMode, DeltaRule};

#[derive(Debug, Args)]
pub struct CheckDeltaArgs {
    /// Rule expression, e.g. `+-0.5`, `+3-7=`, `+-10%`
    #[arg(allow_hyphen_values = true)]
    pub expr: String,

    /// Old value to evaluate the rule against
    #[arg(long, requires = "new", allow_negative_numbers = true)]
    pub old: Option<f64>,

    /// New value to evaluate the rule against
    #[arg(long, requires = "old", allow_negative_numbers = true)]
    pub new: Option<f64>,
}

/// Execute check-delta command
pub fn execute(args: CheckDeltaArgs) -> CommandResult {
    let rule = DeltaRule::parse(&args.expr)?;

    println!("rule: {}", rule);
    println!("mode: {}", mode_name(rule.mode()));
    if rule.mode() != DeltaMode::Sign {
        println!("dx: {}", rule.dx());
        println!("dy: {}", rule.dy());
    }
    println!("inclusive: {}", rule.is_inclusive());

    if let (Some(old), Some(new)) = (args.old, args.new) {
        println!("matches({}, {}): {}", old, new, rule.matches(old, new));
    }

    Ok(Status::Complete)
}

fn mode_name(mode: DeltaMode) -> &'static str {
    match mode {
        DeltaMode::Sign => "sign",
        DeltaMode::Absolute => "absolute",
        DeltaMode::Percent => "percent",
    }
}
