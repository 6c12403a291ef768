//! JSON file record source
//!
//! Two layouts: a single JSON array of objects, or JSON lines (one object per
//! line, blank lines ignored). JSON lines are read lazily; an array file is
//! parsed in one go.

use crate::errors::{io_error, source_parse, Result};
use crate::filter::Filter;
use recdiff_core::{Projection, Record, RecordIter, RecordSource, Selection};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    /// `[{...}, {...}]`
    Array,
    /// One object per line
    Lines,
}

impl JsonLayout {
    /// `.jsonl` and `.ndjson` are JSON lines; anything else is an array
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jsonl") | Some("ndjson") => JsonLayout::Lines,
            _ => JsonLayout::Array,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
    layout: JsonLayout,
}

impl JsonFileSource {
    /// # Errors
    ///
    /// Returns `Io` when `path` is not a readable file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        if !path.is_file() {
            return Err(io_error(
                "open_source",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
            .with_source_name(name));
        }
        Ok(Self {
            layout: JsonLayout::from_path(&path),
            path,
            name,
        })
    }

    pub fn with_layout(mut self, layout: JsonLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> JsonLayout {
        self.layout
    }
}

impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        let filter = Filter::compile(&self.name, selection)?;
        let file = File::open(&self.path)
            .map_err(|e| io_error("query", e).with_source_name(self.name.as_str()))?;
        let projection = projection.clone();
        let name = self.name.as_str();

        match self.layout {
            JsonLayout::Array => {
                let values: Vec<Value> = serde_json::from_reader(BufReader::new(file))
                    .map_err(|e| source_parse(name, &format!("invalid JSON array: {}", e)))?;
                Ok(Box::new(values.into_iter().enumerate().filter_map(
                    move |(index, value)| {
                        admit(name, &filter, &projection, value, || {
                            format!("element {}", index)
                        })
                    },
                )))
            }
            JsonLayout::Lines => Ok(Box::new(
                BufReader::new(file)
                    .lines()
                    .enumerate()
                    .filter_map(move |(index, line)| {
                        let line = match line {
                            Ok(line) => line,
                            Err(e) => return Some(Err(io_error("query", e).with_source_name(name))),
                        };
                        if line.trim().is_empty() {
                            return None;
                        }
                        let value = match serde_json::from_str(&line) {
                            Ok(value) => value,
                            Err(e) => {
                                return Some(Err(source_parse(
                                    name,
                                    &format!("line {}: {}", index + 1, e),
                                )))
                            }
                        };
                        admit(name, &filter, &projection, value, || {
                            format!("line {}", index + 1)
                        })
                    }),
            )),
        }
    }
}

/// Turn one parsed value into a record if it passes the filter
fn admit(
    name: &str,
    filter: &Filter,
    projection: &Projection,
    value: Value,
    position: impl FnOnce() -> String,
) -> Option<Result<Record>> {
    let Some(record) = Record::from_value(value) else {
        return Some(Err(source_parse(
            name,
            &format!("{} is not a JSON object", position()),
        )));
    };
    filter
        .matches(&record)
        .then(|| Ok(record.project(projection)))
}
