//! Canonical schema constants for structured logging and diff events
//!
//! These constants keep the field names emitted by the logging macros, the
//! tracing observer and the error facility consistent.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Diff entities
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_KEY: &str = "key";
pub const FIELD_PROPERTY: &str = "property";

// Counts
pub const FIELD_RECORDS: &str = "records";
pub const FIELD_MISSING_PROPS: &str = "missing_props";
pub const FIELD_MISSING: &str = "missing";
pub const FIELD_ADDITIONAL: &str = "additional";
pub const FIELD_DIFFERENT: &str = "different";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SOURCE_SCANNED: &str = "source_scanned";
pub const EVENT_PARTIAL_PROPERTIES: &str = "partial_properties";
pub const EVENT_ABORTED: &str = "aborted";
