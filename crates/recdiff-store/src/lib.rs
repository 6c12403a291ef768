//! recdiff store - concrete record sources and config loading
//!
//! Provides:
//! - JSON array / JSON-lines file sources
//! - SQLite table sources
//! - In-memory sources
//! - The document-filter dialect used to evaluate selections
//! - Differ configuration files (YAML, TOML, JSON)

pub mod config;
pub mod db;
pub mod errors;
pub mod filter;
pub mod sources;

// Re-export key types
pub use config::{load_config, parse_config_str, ConfigFormat};
pub use errors::Result;
pub use filter::Filter;
pub use sources::{open_source, JsonFileSource, JsonLayout, MemorySource, SqliteSource};
