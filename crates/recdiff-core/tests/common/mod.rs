use recdiff_core::errors::Result;
use recdiff_core::{Projection, Record, RecordIter, RecordSource, Selection};
use serde_json::Value;
use std::cell::RefCell;

/// In-memory source that remembers the last selection and projection it saw
#[allow(dead_code)]
pub struct VecSource {
    name: String,
    records: Vec<Record>,
    seen: RefCell<Option<(Selection, Projection)>>,
}

#[allow(dead_code)]
impl VecSource {
    pub fn new(name: &str, records: Vec<Record>) -> Self {
        Self {
            name: name.to_string(),
            records,
            seen: RefCell::new(None),
        }
    }

    /// Build from JSON objects; non-objects are skipped
    pub fn from_values(name: &str, values: Vec<Value>) -> Self {
        Self::new(name, values.into_iter().filter_map(Record::from_value).collect())
    }

    pub fn last_query(&self) -> Option<(Selection, Projection)> {
        self.seen.borrow().clone()
    }
}

impl RecordSource for VecSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        *self.seen.borrow_mut() = Some((selection.clone(), projection.clone()));
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}

/// Source whose query always fails
#[allow(dead_code)]
pub struct FailingSource;

impl RecordSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn query(&self, _: &Selection, _: &Projection) -> Result<RecordIter<'_>> {
        Err(recdiff_core::ExError::new(recdiff_core::ExErrorKind::Source)
            .with_op("query")
            .with_source_name("failing")
            .with_message("backing store unavailable"))
    }
}
