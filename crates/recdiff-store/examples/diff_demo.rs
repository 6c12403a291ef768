//! Differ walkthrough over in-memory sources
//!
//! Shows the three result sections, a delta and an exact change for the same
//! key, the only-missing mode, and an aborted run.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use recdiff_core::{
    render_human_summary, DiffOptions, Differ, DifferConfig, Record, RecordingObserver, Selection,
};
use recdiff_store::MemorySource;
use serde_json::json;
use std::sync::Arc;

fn material(id: &str, formula: &str, energy: f64) -> Record {
    Record::new()
        .with("task_id", id)
        .with("state", "successful")
        .with("formula", formula)
        .with("energy", energy)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== recdiff Demo ===\n");

    let config = DifferConfig::new("task_id")
        .with_props(["formula"])
        .with_info(["state"])
        .with_filter(Selection::new(json!({"state": "successful"})))
        .with_delta("energy", "+-0.05")?;

    let observer = Arc::new(RecordingObserver::new());
    let differ = Differ::new(config)?.with_observer(observer.clone());

    let old = MemorySource::new(
        "old",
        vec![
            material("mp-1", "NaCl", -3.40),
            material("mp-2", "KCl", -3.10),
            material("mp-3", "LiF", -4.80),
        ],
    );
    let new = MemorySource::new(
        "new",
        vec![
            material("mp-1", "NaCl", -3.41),
            material("mp-2", "KBr", -2.90),
            material("mp-4", "MgO", -5.95),
        ],
    );

    // ===== Part 1: Full diff =====
    println!("## Part 1: Full diff\n");
    let outcome = differ.diff(&old, &new, DiffOptions::default())?;
    println!("{}", serde_json::to_string_pretty(&outcome.to_value())?);
    println!("\n{}", render_human_summary(&outcome));
    println!("Observer saw {} events\n", observer.events().len());

    // ===== Part 2: Only missing =====
    println!("## Part 2: Only missing\n");
    let outcome = differ.diff(&old, &new, DiffOptions::default().only_missing(true))?;
    println!("{}\n", serde_json::to_string_pretty(&outcome.to_value())?);

    // ===== Part 3: Aborted run =====
    println!("## Part 3: Record without a key\n");
    let broken = MemorySource::new(
        "broken",
        vec![Record::new().with("state", "successful").with("formula", "NaCl")],
    );
    let outcome = differ.diff(&broken, &new, DiffOptions::default())?;
    if let Some(reason) = outcome.abort_reason() {
        println!("Aborted: {}", reason);
    }

    println!("\n=== Demo complete ===");
    Ok(())
}
