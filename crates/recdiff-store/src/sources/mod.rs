//! Concrete record sources
//!
//! - [`MemorySource`]: records held in memory
//! - [`JsonFileSource`]: a JSON array file or a JSON-lines file
//! - [`SqliteSource`]: rows of one SQLite table
//!
//! [`open_source`] picks one from a path's extension.

#![allow(clippy::result_large_err)]

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::{JsonFileSource, JsonLayout};
pub use memory::MemorySource;
pub use sqlite::SqliteSource;

use crate::errors::{config_validation, Result};
use recdiff_core::RecordSource;
use std::path::Path;

const SQLITE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Open a source for `path`.
///
/// `.db`, `.sqlite` and `.sqlite3` files are SQLite databases and need a
/// `table`. Everything else is read as JSON (see [`JsonLayout::from_path`]).
///
/// # Errors
///
/// Returns `InvalidConfig` when a table is missing for SQLite or given for a
/// JSON file, and the opening error of the chosen source otherwise.
pub fn open_source(path: &Path, table: Option<&str>) -> Result<Box<dyn RecordSource>> {
    let is_sqlite = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SQLITE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

    match (is_sqlite, table) {
        (true, Some(table)) => Ok(Box::new(SqliteSource::open(path, table)?)),
        (true, None) => Err(config_validation(&format!(
            "{} is a SQLite database; a table name is required",
            path.display()
        ))),
        (false, None) => Ok(Box::new(JsonFileSource::open(path)?)),
        (false, Some(_)) => Err(config_validation(&format!(
            "a table name only applies to SQLite sources, not {}",
            path.display()
        ))),
    }
}
