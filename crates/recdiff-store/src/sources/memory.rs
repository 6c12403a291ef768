//! In-memory record source

use crate::errors::Result;
use crate::filter::Filter;
use recdiff_core::{Projection, Record, RecordIter, RecordSource, Selection};

/// Records held in a vector, filtered and projected on every query
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        let filter = Filter::compile(&self.name, selection)?;
        let projection = projection.clone();
        Ok(Box::new(
            self.records
                .iter()
                .filter(move |record| filter.matches(record))
                .map(move |record| Ok(record.clone().project(&projection))),
        ))
    }
}
