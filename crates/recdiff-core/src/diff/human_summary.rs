//! Human-readable summary renderer for diff outcomes.

use crate::diff::model::{Change, ChangedRecord, DiffOutcome, DiffResult, KeyedRecord};

/// How many records to list per section before eliding
const MAX_LISTED: usize = 50;

/// Render a Markdown summary of a [`DiffOutcome`].
///
/// Informational only; the structured value from
/// [`DiffOutcome::to_value`] is the machine-readable form.
pub fn render_human_summary(outcome: &DiffOutcome) -> String {
    let mut out = String::new();
    out.push_str("## Record Diff\n\n");

    let result = match outcome {
        DiffOutcome::Aborted(reason) => {
            out.push_str(&format!(
                "**Status**: Aborted (`{}`)\n\n_{}._\n",
                reason.kind().code(),
                reason
            ));
            return out;
        }
        DiffOutcome::Complete(result) => result,
    };

    out.push_str(&format!(
        "**Status**: Complete  \n**Key field**: `{}`\n\n",
        result.key_field
    ));
    render_counts(&mut out, result);

    if result.is_empty() {
        out.push_str("_No differences detected._\n");
        return out;
    }

    render_keyed(&mut out, "Missing", &result.missing);
    if let Some(additional) = &result.additional {
        render_keyed(&mut out, "Additional", additional);
    }

    if !result.different.is_empty() {
        out.push_str("### Different\n\n");
        for record in result.different.iter().take(MAX_LISTED) {
            out.push_str(&format!("- {}\n", describe_change(record)));
        }
        elided(&mut out, result.different.len());
        out.push('\n');
    }

    out
}

fn render_counts(out: &mut String, result: &DiffResult) {
    let additional = result
        .additional_count()
        .map_or_else(|| "not computed".to_string(), |n| n.to_string());
    out.push_str(&format!(
        "| Missing | Additional | Different |\n\
         |---|---|---|\n\
         | {} | {} | {} |\n\n",
        result.missing.len(),
        additional,
        result.different.len()
    ));
}

fn render_keyed(out: &mut String, title: &str, records: &[KeyedRecord]) {
    if records.is_empty() {
        return;
    }
    out.push_str(&format!("### {} ({})\n\n", title, records.len()));
    for record in records.iter().take(MAX_LISTED) {
        out.push_str(&format!("- `{}`", record.key));
        if !record.info.is_empty() {
            let fields: Vec<String> = record
                .info
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            out.push_str(&format!(" ({})", fields.join(", ")));
        }
        out.push('\n');
    }
    elided(out, records.len());
    out.push('\n');
}

fn describe_change(record: &ChangedRecord) -> String {
    match &record.change {
        Change::Delta {
            property,
            old,
            new,
            rule,
        } => format!(
            "`{}` **{}**: {:.6} → {:.6} (rule `{}`)",
            record.key, property, old, new, rule
        ),
        Change::Exact { old, new } => {
            let changed: Vec<String> = old
                .iter()
                .zip(new.iter())
                .filter(|(a, b)| a.1 != b.1)
                .map(|(a, b)| format!("{}: `{}` → `{}`", a.0, a.1, b.1))
                .collect();
            format!("`{}` exact: {}", record.key, changed.join(", "))
        }
    }
}

fn elided(out: &mut String, total: usize) {
    if total > MAX_LISTED {
        out.push_str(&format!("- _… {} more_\n", total - MAX_LISTED));
    }
}
