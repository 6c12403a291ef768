//! Record diff engine.
//!
//! Compares two record collections keyed on a chosen field and reports keys
//! that disappeared, keys that appeared, and keys whose values changed.
//!
//! ## Entry point
//!
//! ```ignore
//! use recdiff_core::diff::{Differ, DiffOptions};
//!
//! let differ = Differ::new(config)?;
//! let outcome = differ.diff(&old_source, &new_source, DiffOptions::default())?;
//! let summary = recdiff_core::diff::render_human_summary(&outcome);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: every result list follows key order, so identical
//!   inputs produce identical output.
//! - **Abort is not failure**: a missing key field or a source with no usable
//!   properties yields [`DiffOutcome::Aborted`], never a partial result.
//! - **Integrity errors are fatal**: duplicate keys and non-numeric values in
//!   delta properties stop the run with an error.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{DiffOptions, Differ};
pub use human_summary::render_human_summary;
pub use model::{AbortReason, Change, ChangedRecord, DiffOutcome, DiffResult, KeyedRecord};
