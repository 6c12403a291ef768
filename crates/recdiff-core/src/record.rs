//! Record model consumed by the extractor.
//!
//! A [`Record`] is a JSON-shaped field map. Field lookup distinguishes an
//! absent field (`None`) from a field that is present and null
//! (`Some(Value::Null)`).

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Name of the identity field stores attach to every record
pub const IDENTITY_FIELD: &str = "_id";

/// One record produced by a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Look up a field; `None` means absent, not null
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the fields the projection asks for
    pub fn project(self, projection: &Projection) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(name, _)| projection.includes(name))
                .collect(),
        )
    }

    /// Convert a JSON object into a record; any other value yields `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Key identifying the same logical record across two sources
///
/// Any JSON value can be a key. Equality, hashing and ordering use the
/// compact JSON text of the value, so `"1"` and `1` are different keys.
#[derive(Debug, Clone)]
pub struct RecordKey {
    value: Value,
    canonical: String,
}

impl RecordKey {
    pub fn new(value: Value) -> Self {
        let canonical = value.to_string();
        Self { value, canonical }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Compact JSON text of the key
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => f.write_str(s),
            _ => f.write_str(&self.canonical),
        }
    }
}

impl Serialize for RecordKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self::new(Value::String(s.to_string()))
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        Self::new(Value::from(n))
    }
}

/// Opaque selection criterion
///
/// The diff engine forwards this value to each source untouched; only the
/// source decides what it means (a filter document, a `WHERE` clause, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Value);

impl Selection {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Select every record
    pub fn all() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// True when the criterion places no restriction (null or `{}`)
    pub fn is_all(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field projection requested from a source
///
/// An empty projection selects every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            excluded: BTreeSet::new(),
        }
    }

    /// Explicitly drop a field, even if the source would add it by default
    pub fn excluding(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.fields.remove(&field);
        self.excluded.insert(field);
        self
    }

    /// An empty field list places no restriction; exclusions always apply
    pub fn includes(&self, field: &str) -> bool {
        (self.fields.is_empty() || self.fields.contains(field)) && !self.excluded.contains(field)
    }

    /// True when nothing is restricted or excluded
    pub fn is_unrestricted(&self) -> bool {
        self.fields.is_empty() && self.excluded.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "[{}]", fields.join(","))?;
        let excluded: Vec<&str> = self.excluded().collect();
        if !excluded.is_empty() {
            write!(f, " -[{}]", excluded.join(","))?;
        }
        Ok(())
    }
}
