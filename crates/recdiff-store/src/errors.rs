//! Error handling for recdiff-store
//!
//! Wraps recdiff-core ExError with store-specific helpers

use recdiff_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a configuration validation error
pub fn config_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("load_config")
        .with_message(reason.to_string())
}

/// Create a parse error for a record source (bad JSON, non-object record)
pub fn source_parse(source_name: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Source)
        .with_op("query")
        .with_source_name(source_name)
        .with_message(reason.to_string())
}

/// Create an error for a selection the source cannot evaluate
pub fn invalid_selection(source_name: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidSelection)
        .with_op("query")
        .with_source_name(source_name)
        .with_message(reason.to_string())
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
