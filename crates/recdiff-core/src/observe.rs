//! Diagnostic event sink for differ runs.
//!
//! The differ never writes logs directly. It reports [`DiffEvent`]s to a
//! [`DiffObserver`] supplied by the caller. [`TracingObserver`] forwards them
//! to the structured logging facility, [`RecordingObserver`] keeps them for
//! assertions, and [`NoopObserver`] drops them.

use crate::diff::model::AbortReason;
use crate::errors::ExError;
use crate::{log_op_end, log_op_error, log_op_start};
use recdiff_core_types::schema;
use recdiff_core_types::RunContext;
use std::sync::Mutex;

/// Operation name used for differ runs in structured logs
pub const OP_DIFF: &str = "diff";

#[derive(Debug, Clone)]
pub enum DiffEvent {
    /// Run started; both sources are about to be queried
    Started { selection: String, projection: String },
    /// One source was fully scanned
    SourceScanned {
        source: String,
        records: usize,
        missing_props: usize,
        duration_ms: u64,
    },
    /// Some, but not all, records lacked compared properties
    PartialProperties {
        source: String,
        missing_props: usize,
        records: usize,
    },
    /// Run stopped without a result
    Aborted { reason: AbortReason, duration_ms: u64 },
    /// Run produced a result
    Finished {
        missing: usize,
        additional: Option<usize>,
        different: usize,
        duration_ms: u64,
    },
    /// Run failed with an error
    Failed { error: ExError, duration_ms: u64 },
}

impl DiffEvent {
    /// True for events a caller should surface as warnings or worse
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            DiffEvent::PartialProperties { .. }
                | DiffEvent::Aborted { .. }
                | DiffEvent::Failed { .. }
        )
    }
}

/// Receiver for differ diagnostics
pub trait DiffObserver: Send + Sync {
    fn observe(&self, ctx: &RunContext, event: &DiffEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DiffObserver for NoopObserver {
    fn observe(&self, _ctx: &RunContext, _event: &DiffEvent) {}
}

/// Emits events through `tracing` using the canonical operation fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DiffObserver for TracingObserver {
    fn observe(&self, ctx: &RunContext, event: &DiffEvent) {
        let run_id = ctx.run_id.as_str();
        match event {
            DiffEvent::Started {
                selection,
                projection,
            } => {
                log_op_start!(
                    OP_DIFF,
                    run_id = run_id,
                    trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
                    selection = selection.as_str(),
                    projection = projection.as_str()
                );
            }
            DiffEvent::SourceScanned {
                source,
                records,
                missing_props,
                duration_ms,
            } => {
                tracing::debug!(
                    component = module_path!(),
                    op = OP_DIFF,
                    event = schema::EVENT_SOURCE_SCANNED,
                    run_id = run_id,
                    source = source.as_str(),
                    records = *records as u64,
                    missing_props = *missing_props as u64,
                    duration_ms = *duration_ms,
                );
            }
            DiffEvent::PartialProperties {
                source,
                missing_props,
                records,
            } => {
                tracing::warn!(
                    component = module_path!(),
                    op = OP_DIFF,
                    event = schema::EVENT_PARTIAL_PROPERTIES,
                    run_id = run_id,
                    source = source.as_str(),
                    records = *records as u64,
                    missing_props = *missing_props as u64,
                    "{} of {} records in '{}' lack compared properties",
                    missing_props,
                    records,
                    source
                );
            }
            DiffEvent::Aborted {
                reason,
                duration_ms,
            } => {
                tracing::error!(
                    component = module_path!(),
                    op = OP_DIFF,
                    event = schema::EVENT_ABORTED,
                    run_id = run_id,
                    source = reason.source_name(),
                    err.code = reason.kind().code(),
                    duration_ms = *duration_ms,
                    "{}",
                    reason
                );
            }
            DiffEvent::Finished {
                missing,
                additional,
                different,
                duration_ms,
            } => {
                log_op_end!(
                    OP_DIFF,
                    duration_ms = *duration_ms,
                    run_id = run_id,
                    missing = *missing as u64,
                    additional = additional.map(|n| n as u64),
                    different = *different as u64
                );
            }
            DiffEvent::Failed { error, duration_ms } => {
                log_op_error!(
                    OP_DIFF,
                    error.clone(),
                    duration_ms = *duration_ms,
                    run_id = run_id,
                    source = error.source_name(),
                    key = error.key(),
                    property = error.property()
                );
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DiffEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiffEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<DiffEvent> {
        self.events()
            .into_iter()
            .filter(DiffEvent::is_warning)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

impl DiffObserver for RecordingObserver {
    fn observe(&self, _ctx: &RunContext, event: &DiffEvent) {
        self.events
            .lock()
            .map(|mut events| events.push(event.clone()))
            .ok();
    }
}
