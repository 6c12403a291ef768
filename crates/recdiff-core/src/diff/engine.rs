//! Differ: compares two record sources under one configuration.
//!
//! Both sources are scanned with the same selection and projection. Keys
//! only in the old source are `missing`, keys only in the new source are
//! `additional`, and keys in both are checked against every delta rule and
//! the equality tuple.

use crate::config::DifferConfig;
use crate::diff::model::{ChangedRecord, DiffOutcome, DiffResult, KeyedRecord};
use crate::errors::Result;
use crate::extract::{extract, ExtractSpec, Extraction, RecordSnapshot};
use crate::observe::{DiffEvent, DiffObserver, TracingObserver};
use crate::record::{Projection, RecordKey};
use crate::source::RecordSource;
use recdiff_core_types::RunContext;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Leave `additional` out of the result; missing and changed keys are
    /// still reported
    pub only_missing: bool,
    /// Let a key repeat within one source; the later record wins
    pub allow_duplicates: bool,
}

impl DiffOptions {
    pub fn only_missing(mut self, on: bool) -> Self {
        self.only_missing = on;
        self
    }

    pub fn allow_duplicates(mut self, on: bool) -> Self {
        self.allow_duplicates = on;
        self
    }
}

type InfoMap = BTreeMap<RecordKey, Map<String, Value>>;

/// Record differ. Cheap to clone; holds no per-run state.
#[derive(Clone)]
pub struct Differ {
    config: DifferConfig,
    observer: Arc<dyn DiffObserver>,
}

impl std::fmt::Debug for Differ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Differ")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Differ {
    /// Build a differ that reports through [`TracingObserver`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the configuration fails validation.
    pub fn new(config: DifferConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn DiffObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &DifferConfig {
        &self.config
    }

    /// Compare `old` against `new` under a fresh run context
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` / `NotANumber`: integrity violations in either source
    /// - any error raised by a source
    ///
    /// Structural problems (missing key field, no usable properties) are not
    /// errors; they come back as [`DiffOutcome::Aborted`].
    pub fn diff(
        &self,
        old: &dyn RecordSource,
        new: &dyn RecordSource,
        options: DiffOptions,
    ) -> Result<DiffOutcome> {
        self.diff_in_context(&RunContext::new(), old, new, options)
    }

    /// Same as [`Differ::diff`], tagging events and errors with `ctx`
    ///
    /// # Errors
    ///
    /// See [`Differ::diff`].
    pub fn diff_in_context(
        &self,
        ctx: &RunContext,
        old: &dyn RecordSource,
        new: &dyn RecordSource,
        options: DiffOptions,
    ) -> Result<DiffOutcome> {
        let start = Instant::now();
        let projection = self.config.projection();
        self.observer.observe(
            ctx,
            &DiffEvent::Started {
                selection: self.config.filter.to_string(),
                projection: projection.to_string(),
            },
        );

        let outcome = self.run(ctx, old, new, &projection, options);
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(DiffOutcome::Complete(result)) => {
                self.observer.observe(
                    ctx,
                    &DiffEvent::Finished {
                        missing: result.missing.len(),
                        additional: result.additional_count(),
                        different: result.different.len(),
                        duration_ms,
                    },
                );
                Ok(DiffOutcome::Complete(result))
            }
            Ok(DiffOutcome::Aborted(reason)) => {
                self.observer.observe(
                    ctx,
                    &DiffEvent::Aborted {
                        reason: reason.clone(),
                        duration_ms,
                    },
                );
                Ok(DiffOutcome::Aborted(reason))
            }
            Err(err) => {
                let mut err = err.with_run_id(ctx.run_id.clone());
                if let Some(trace_id) = &ctx.trace_id {
                    err = err.with_trace_id(trace_id.clone());
                }
                self.observer.observe(
                    ctx,
                    &DiffEvent::Failed {
                        error: err.clone(),
                        duration_ms,
                    },
                );
                Err(err)
            }
        }
    }

    fn run(
        &self,
        ctx: &RunContext,
        old: &dyn RecordSource,
        new: &dyn RecordSource,
        projection: &Projection,
        options: DiffOptions,
    ) -> Result<DiffOutcome> {
        let spec = self.config.extract_spec(options.allow_duplicates);

        let old = match self.scan(ctx, old, projection, &spec)? {
            Extraction::Complete(snapshot) => snapshot,
            Extraction::Aborted(reason) => return Ok(DiffOutcome::Aborted(reason)),
        };
        let new = match self.scan(ctx, new, projection, &spec)? {
            Extraction::Complete(snapshot) => snapshot,
            Extraction::Aborted(reason) => return Ok(DiffOutcome::Aborted(reason)),
        };

        let info = merge_info(&old, &new);
        let keyed = |key: &RecordKey| {
            let record = KeyedRecord::new(key.clone());
            match info.get(key) {
                Some(fields) => record.with_info(fields.clone()),
                None => record,
            }
        };

        let mut result = DiffResult::new(self.config.key.as_str());
        result.missing = old.keys().difference(new.keys()).map(keyed).collect();

        if !options.only_missing {
            result.additional = Some(new.keys().difference(old.keys()).map(keyed).collect());
        }
        result.different = self.changed_records(&old, &new, &info);

        Ok(DiffOutcome::Complete(result))
    }

    fn scan(
        &self,
        ctx: &RunContext,
        source: &dyn RecordSource,
        projection: &Projection,
        spec: &ExtractSpec,
    ) -> Result<Extraction> {
        let start = Instant::now();
        let extraction = extract(source, &self.config.filter, projection, spec)?;
        if let Extraction::Complete(snapshot) = &extraction {
            self.observer.observe(
                ctx,
                &DiffEvent::SourceScanned {
                    source: snapshot.source_name().to_string(),
                    records: snapshot.records(),
                    missing_props: snapshot.missing_props(),
                    duration_ms: start.elapsed().as_millis() as u64,
                },
            );
            if snapshot.missing_props() > 0 {
                self.observer.observe(
                    ctx,
                    &DiffEvent::PartialProperties {
                        source: snapshot.source_name().to_string(),
                        missing_props: snapshot.missing_props(),
                        records: snapshot.records(),
                    },
                );
            }
        }
        Ok(extraction)
    }

    /// Delta records first (in property order), then the exact record, per key
    fn changed_records(
        &self,
        old: &RecordSnapshot,
        new: &RecordSnapshot,
        info: &InfoMap,
    ) -> Vec<ChangedRecord> {
        let mut changed = Vec::new();

        for key in old.keys().intersection(new.keys()) {
            let first = changed.len();

            for (property, rule) in &self.config.deltas {
                let (Some(before), Some(after)) =
                    (old.numeric(key, property), new.numeric(key, property))
                else {
                    continue;
                };
                if rule.matches(before, after) {
                    changed.push(ChangedRecord::delta(
                        key.clone(),
                        property,
                        before,
                        after,
                        rule,
                    ));
                }
            }

            if let (Some(before), Some(after)) = (old.equality(key), new.equality(key)) {
                if before != after {
                    changed.push(ChangedRecord::exact(key.clone(), before.clone(), after.clone()));
                }
            }

            if let Some(fields) = info.get(key) {
                for record in &mut changed[first..] {
                    record.merge_info(fields);
                }
            }
        }

        changed
    }
}

/// Informational fields per key: old source first, new source overwrites
fn merge_info(old: &RecordSnapshot, new: &RecordSnapshot) -> InfoMap {
    let mut merged = InfoMap::new();
    for snapshot in [old, new] {
        for key in snapshot.keys() {
            if let Some(fields) = snapshot.info(key) {
                let entry = merged.entry(key.clone()).or_default();
                for (name, value) in fields {
                    entry.insert(name.clone(), value.clone());
                }
            }
        }
    }
    merged
}
