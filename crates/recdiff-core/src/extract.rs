//! Record extraction: one source in, one comparison-ready snapshot out.
//!
//! ## Per-record rules
//!
//! - The key field must be present. A single record without it aborts the
//!   whole source ([`AbortReason::MissingKeyField`]).
//! - A repeated key is an integrity error unless duplicates are allowed, in
//!   which case the later record's numeric and equality values replace the
//!   earlier ones and its informational fields are merged over them.
//! - Numeric properties must coerce to `f64`. Absent is tolerated and counted
//!   as a missing property; present but non-numeric is an integrity error.
//! - The equality tuple is all-or-nothing: one absent field drops the tuple
//!   for that key and counts as a missing property.
//!
//! When properties are configured and every scanned record was missing at
//! least one of them, the source is unusable
//! ([`AbortReason::PropertiesUnavailable`]).

use crate::diff::model::AbortReason;
use crate::errors::{DiffError, Result};
use crate::record::{Projection, Record, RecordKey, Selection};
use crate::source::RecordSource;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered `(field, stringified value)` pairs compared for exact matches
pub type EqualityTuple = Vec<(String, String)>;

/// Which fields to pull out of each record
#[derive(Debug, Clone, Default)]
pub struct ExtractSpec {
    pub key_field: String,
    /// Properties compared with delta rules
    pub numeric: Vec<String>,
    /// Properties compared for exact equality, in tuple order
    pub equality: Vec<String>,
    /// Display-only fields copied into the result
    pub info: Vec<String>,
    pub allow_duplicates: bool,
}

impl ExtractSpec {
    fn has_props(&self) -> bool {
        !self.numeric.is_empty() || !self.equality.is_empty()
    }
}

/// Extracted, comparison-ready values for one source
#[derive(Debug, Clone, Default)]
pub struct RecordSnapshot {
    source_name: String,
    keys: BTreeSet<RecordKey>,
    numeric: BTreeMap<RecordKey, BTreeMap<String, f64>>,
    equality: BTreeMap<RecordKey, EqualityTuple>,
    info: BTreeMap<RecordKey, Map<String, Value>>,
    records: usize,
    missing_props: usize,
}

impl RecordSnapshot {
    fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            ..Self::default()
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn keys(&self) -> &BTreeSet<RecordKey> {
        &self.keys
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    /// Numeric value of `property` for `key`, if it was extracted
    pub fn numeric(&self, key: &RecordKey, property: &str) -> Option<f64> {
        self.numeric.get(key)?.get(property).copied()
    }

    pub fn equality(&self, key: &RecordKey) -> Option<&EqualityTuple> {
        self.equality.get(key)
    }

    pub fn info(&self, key: &RecordKey) -> Option<&Map<String, Value>> {
        self.info.get(key)
    }

    /// Number of records scanned
    pub fn records(&self) -> usize {
        self.records
    }

    /// Number of scanned records that lacked at least one compared property
    pub fn missing_props(&self) -> usize {
        self.missing_props
    }
}

/// Result of scanning one source
#[derive(Debug, Clone)]
pub enum Extraction {
    Complete(RecordSnapshot),
    Aborted(AbortReason),
}

/// Scan `source` and build its snapshot.
///
/// # Errors
///
/// - `DuplicateKey`: repeated key while duplicates are disallowed
/// - `NotANumber`: a numeric property held a non-numeric value
/// - any error raised by the source itself
pub fn extract(
    source: &dyn RecordSource,
    selection: &Selection,
    projection: &Projection,
    spec: &ExtractSpec,
) -> Result<Extraction> {
    let mut snapshot = RecordSnapshot::new(source.name());

    for (index, record) in source.query(selection, projection)?.enumerate() {
        let record = record?;
        snapshot.records += 1;

        let Some(raw_key) = record.get(&spec.key_field) else {
            return Ok(Extraction::Aborted(AbortReason::MissingKeyField {
                source: snapshot.source_name,
                key_field: spec.key_field.clone(),
                record_index: index,
            }));
        };
        let key = RecordKey::new(raw_key.clone());

        if !snapshot.keys.insert(key.clone()) && !spec.allow_duplicates {
            return Err(DiffError::DuplicateKey {
                source_name: snapshot.source_name,
                key: key.to_string(),
            }
            .into());
        }

        let mut missing = false;

        if !spec.numeric.is_empty() {
            let mut values = BTreeMap::new();
            for property in &spec.numeric {
                match record.get(property) {
                    None => missing = true,
                    Some(value) => {
                        let number = coerce_f64(value).ok_or_else(|| DiffError::NotANumber {
                            source_name: snapshot.source_name.clone(),
                            key: key.to_string(),
                            property: property.clone(),
                            value: stringify(value),
                        })?;
                        values.insert(property.clone(), number);
                    }
                }
            }
            snapshot.numeric.insert(key.clone(), values);
        }

        if !spec.equality.is_empty() {
            match equality_tuple(&record, &spec.equality) {
                Some(tuple) => {
                    snapshot.equality.insert(key.clone(), tuple);
                }
                None => {
                    missing = true;
                    snapshot.equality.remove(&key);
                }
            }
        }

        if missing {
            snapshot.missing_props += 1;
        }

        if !spec.info.is_empty() {
            let entry = snapshot.info.entry(key).or_default();
            for field in &spec.info {
                if let Some(value) = record.get(field) {
                    entry.insert(field.clone(), value.clone());
                }
            }
        }
    }

    if spec.has_props() && snapshot.records > 0 && snapshot.missing_props == snapshot.records {
        return Ok(Extraction::Aborted(AbortReason::PropertiesUnavailable {
            source: snapshot.source_name,
            records: snapshot.records,
        }));
    }

    Ok(Extraction::Complete(snapshot))
}

fn equality_tuple(record: &Record, fields: &[String]) -> Option<EqualityTuple> {
    fields
        .iter()
        .map(|field| {
            record
                .get(field)
                .map(|value| (field.clone(), stringify(value)))
        })
        .collect()
}

/// Coerce a field value to a float: numbers, numeric strings and booleans
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text form used in equality tuples: strings verbatim, anything else as JSON
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
