//! Record source capability
//!
//! This module defines the `RecordSource` trait, the only thing the diff
//! engine needs from a backing store. Implementations live outside the core
//! (files, SQLite, in-memory fixtures).

use crate::errors::Result;
use crate::record::{Projection, Record, Selection};

/// Lazy sequence of records; each item may fail with a source error
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// A queryable collection of records
///
/// The selection criterion is forwarded untouched from the differ
/// configuration. Sources are expected to apply the projection, but the
/// extractor only reads the fields it asked for, so a source that returns
/// extra fields is still correct.
pub trait RecordSource {
    /// Human-readable name used in events and error context
    fn name(&self) -> &str;

    /// Produce the records matching `selection`, projected to `projection`
    ///
    /// # Errors
    ///
    /// Returns an error when the query cannot start (bad criterion, missing
    /// file, database failure). Failures while iterating are reported per item.
    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        (**self).query(selection, projection)
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        (**self).query(selection, projection)
    }
}
