//! Diff output types.
//!
//! Lists are built from ordered key sets, so the same inputs always produce
//! the same ordering. [`DiffResult::to_value`] renders the serialized output
//! shape: an object with `missing`, `additional` (only when computed) and
//! `different` lists.

use crate::delta::DeltaRule;
use crate::errors::ExErrorKind;
use crate::extract::EqualityTuple;
use crate::record::RecordKey;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Output section: keys only in the old source
pub const MISSING: &str = "missing";
/// Output section: keys only in the new source
pub const ADDITIONAL: &str = "additional";
/// Output section: keys in both sources whose values changed
pub const DIFFERENT: &str = "different";

/// Field naming the change kind in a changed record
pub const MATCH_TYPE: &str = "match_type";

/// A key present on one side only, with its informational fields
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecord {
    pub key: RecordKey,
    pub info: Map<String, Value>,
}

impl KeyedRecord {
    pub fn new(key: RecordKey) -> Self {
        Self {
            key,
            info: Map::new(),
        }
    }

    pub fn with_info(mut self, info: Map<String, Value>) -> Self {
        self.info = info;
        self
    }

    /// Render as `{<info fields>, <key_field>: key}`
    pub fn to_value(&self, key_field: &str) -> Value {
        let mut out = self.info.clone();
        out.insert(key_field.to_string(), self.key.value().clone());
        Value::Object(out)
    }
}

/// What changed for one key
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A numeric property moved beyond its delta rule
    Delta {
        property: String,
        old: f64,
        new: f64,
        rule: DeltaRule,
    },
    /// The equality tuples differ
    Exact {
        old: EqualityTuple,
        new: EqualityTuple,
    },
}

impl Change {
    pub fn match_type(&self) -> &'static str {
        match self {
            Change::Delta { .. } => "delta",
            Change::Exact { .. } => "exact",
        }
    }
}

/// A change record for a key present in both sources
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedRecord {
    pub key: RecordKey,
    pub change: Change,
    pub info: Map<String, Value>,
}

impl ChangedRecord {
    pub fn delta(
        key: RecordKey,
        property: impl Into<String>,
        old: f64,
        new: f64,
        rule: &DeltaRule,
    ) -> Self {
        Self {
            key,
            change: Change::Delta {
                property: property.into(),
                old,
                new,
                rule: rule.clone(),
            },
            info: Map::new(),
        }
    }

    pub fn exact(key: RecordKey, old: EqualityTuple, new: EqualityTuple) -> Self {
        Self {
            key,
            change: Change::Exact { old, new },
            info: Map::new(),
        }
    }

    /// Copy informational fields into this record; later values overwrite
    pub fn merge_info(&mut self, fields: &Map<String, Value>) -> &mut Self {
        for (name, value) in fields {
            self.info.insert(name.clone(), value.clone());
        }
        self
    }

    /// Render as a flat object. Core fields win over informational fields
    /// with the same name.
    pub fn to_value(&self, key_field: &str) -> Value {
        let mut out = self.info.clone();
        out.insert(MATCH_TYPE.to_string(), Value::from(self.change.match_type()));
        out.insert(key_field.to_string(), self.key.value().clone());
        match &self.change {
            Change::Delta {
                property,
                old,
                new,
                rule,
            } => {
                out.insert("property".to_string(), Value::from(property.as_str()));
                out.insert("old".to_string(), Value::from(format!("{:.6}", old)));
                out.insert("new".to_string(), Value::from(format!("{:.6}", new)));
                out.insert("rule".to_string(), Value::from(rule.expr()));
            }
            Change::Exact { old, new } => {
                out.insert("old".to_string(), tuple_value(old));
                out.insert("new".to_string(), tuple_value(new));
            }
        }
        Value::Object(out)
    }
}

fn tuple_value(tuple: &EqualityTuple) -> Value {
    Value::Array(
        tuple
            .iter()
            .map(|(field, value)| {
                Value::Array(vec![
                    Value::from(field.as_str()),
                    Value::from(value.as_str()),
                ])
            })
            .collect(),
    )
}

/// Completed comparison of two sources
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Key field name used when rendering records
    pub key_field: String,
    pub missing: Vec<KeyedRecord>,
    /// `None` when the run was restricted to missing keys
    pub additional: Option<Vec<KeyedRecord>>,
    pub different: Vec<ChangedRecord>,
}

impl DiffResult {
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            missing: Vec::new(),
            additional: Some(Vec::new()),
            different: Vec::new(),
        }
    }

    /// True when nothing is missing, additional or different
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
            && self.additional.as_ref().map_or(true, Vec::is_empty)
            && self.different.is_empty()
    }

    pub fn additional_count(&self) -> Option<usize> {
        self.additional.as_ref().map(Vec::len)
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            MISSING.to_string(),
            Value::Array(self.missing.iter().map(|r| r.to_value(&self.key_field)).collect()),
        );
        if let Some(additional) = &self.additional {
            out.insert(
                ADDITIONAL.to_string(),
                Value::Array(additional.iter().map(|r| r.to_value(&self.key_field)).collect()),
            );
        }
        out.insert(
            DIFFERENT.to_string(),
            Value::Array(self.different.iter().map(|r| r.to_value(&self.key_field)).collect()),
        );
        Value::Object(out)
    }
}

impl Serialize for DiffResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Why a run produced no result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    /// A record in `source` had no key field
    MissingKeyField {
        source: String,
        key_field: String,
        record_index: usize,
    },
    /// Every record in `source` lacked at least one compared property
    PropertiesUnavailable { source: String, records: usize },
}

impl AbortReason {
    pub fn kind(&self) -> ExErrorKind {
        match self {
            AbortReason::MissingKeyField { .. } => ExErrorKind::MissingKeyField,
            AbortReason::PropertiesUnavailable { .. } => ExErrorKind::PropertiesUnavailable,
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            AbortReason::MissingKeyField { source, .. }
            | AbortReason::PropertiesUnavailable { source, .. } => source,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::MissingKeyField {
                source,
                key_field,
                record_index,
            } => write!(
                f,
                "record {} in '{}' has no key field '{}'",
                record_index, source, key_field
            ),
            AbortReason::PropertiesUnavailable { source, records } => write!(
                f,
                "all {} records in '{}' are missing compared properties",
                records, source
            ),
        }
    }
}

/// Result of one differ run
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    Complete(DiffResult),
    Aborted(AbortReason),
}

impl DiffOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, DiffOutcome::Complete(_))
    }

    pub fn result(&self) -> Option<&DiffResult> {
        match self {
            DiffOutcome::Complete(result) => Some(result),
            DiffOutcome::Aborted(_) => None,
        }
    }

    pub fn into_result(self) -> Option<DiffResult> {
        match self {
            DiffOutcome::Complete(result) => Some(result),
            DiffOutcome::Aborted(_) => None,
        }
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match self {
            DiffOutcome::Complete(_) => None,
            DiffOutcome::Aborted(reason) => Some(reason),
        }
    }

    /// Serialized form; an aborted run renders as an empty object
    pub fn to_value(&self) -> Value {
        match self {
            DiffOutcome::Complete(result) => result.to_value(),
            DiffOutcome::Aborted(_) => Value::Object(Map::new()),
        }
    }
}
