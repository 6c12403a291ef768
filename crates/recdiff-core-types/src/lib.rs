//! Core types shared across recdiff facilities
//!
//! This crate provides foundational types used by the error, logging and
//! observability facilities of the diff engine:
//!
//! - **Correlation types**: RunId, TraceId, RunContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RunContext, RunId, TraceId};
