//! recdiff core - keyed record comparison engine
//!
//! This crate compares two collections of records that share a key field and
//! reports:
//! - keys present only in the old collection (`missing`)
//! - keys present only in the new collection (`additional`)
//! - keys present in both whose numeric properties moved beyond a delta rule,
//!   or whose equality properties differ (`different`)
//!
//! Storage is abstracted behind [`source::RecordSource`]; concrete sources
//! live in `recdiff-store`.

pub mod config;
pub mod delta;
pub mod diff;
pub mod errors;
pub mod extract;
pub mod logging_facility;
pub mod observe;
pub mod record;
pub mod source;

#[doc(hidden)]
pub use recdiff_core_types as core_types;

// Re-export commonly used types
pub use config::DifferConfig;
pub use delta::{DeltaMode, DeltaRule};
pub use diff::{
    render_human_summary, AbortReason, Change, ChangedRecord, DiffOptions, DiffOutcome, DiffResult,
    Differ, KeyedRecord,
};
pub use errors::{DiffError, ExError, ExErrorKind, Result};
pub use observe::{DiffEvent, DiffObserver, NoopObserver, RecordingObserver, TracingObserver};
pub use record::{Projection, Record, RecordKey, Selection, IDENTITY_FIELD};
pub use recdiff_core_types::{RunContext, RunId, TraceId};
pub use source::{RecordIter, RecordSource};
