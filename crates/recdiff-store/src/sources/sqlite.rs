//! SQLite table record source
//!
//! Each row of the table is one record with one field per column. SQL NULL is
//! a present null field. Fields that are not columns are absent. BLOB values
//! become lowercase hex strings; TEXT that is not valid UTF-8 fails the query.
//!
//! Selections:
//! - null or `{}`: every row
//! - a string: used verbatim as the `WHERE` clause
//! - an object: the document-filter dialect of [`crate::filter`], translated
//!   to a parameterised `WHERE` clause

#![allow(clippy::result_large_err)]

use crate::db::{open_read_only, quote_ident, table_columns};
use crate::errors::{config_validation, from_rusqlite, invalid_selection, Result};
use crate::filter::Filter;
use recdiff_core::{Projection, Record, RecordIter, RecordSource, Selection};
use rusqlite::types::{Type, Value as SqlValue, ValueRef};
use rusqlite::Connection;
use serde_json::{Map, Number, Value};
use std::path::Path;

pub struct SqliteSource {
    conn: Connection,
    table: String,
    name: String,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("name", &self.name)
            .field("table", &self.table)
            .finish()
    }
}

impl SqliteSource {
    /// Open `table` in the database at `path`, read-only
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the database cannot be opened and
    /// `InvalidConfig` if the table does not exist.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        let conn = open_read_only(path)?;
        let name = format!("{}:{}", path.display(), table);
        Self::from_connection(conn, table, name)
    }

    /// Wrap an existing connection
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the table does not exist.
    pub fn from_connection(conn: Connection, table: &str, name: impl Into<String>) -> Result<Self> {
        if table_columns(&conn, table)?.is_empty() {
            return Err(config_validation(&format!("no such table: {}", table)));
        }
        Ok(Self {
            conn,
            table: table.to_string(),
            name: name.into(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn build_query(
        &self,
        selection: &Selection,
        projection: &Projection,
    ) -> Result<(String, Vec<SqlValue>)> {
        let columns = table_columns(&self.conn, &self.table)
            .map_err(|e| e.with_source_name(self.name.as_str()))?;
        let selected: Vec<String> = columns
            .iter()
            .filter(|c| projection.includes(c))
            .map(|c| quote_ident(c))
            .collect();
        // A projection naming no existing column still needs a valid select list
        let select_list = if selected.is_empty() {
            "NULL AS __recdiff_empty".to_string()
        } else {
            selected.join(", ")
        };

        let (clause, params) = match selection.as_value() {
            Value::String(text) if text.trim().is_empty() => ("1".to_string(), Vec::new()),
            Value::String(text) => (format!("({})", text), Vec::new()),
            _ => {
                let filter = Filter::compile(&self.name, selection)?;
                let (clause, params) = filter.to_sql(&columns);
                let params = params
                    .iter()
                    .map(|v| to_sql_value(&self.name, v))
                    .collect::<Result<Vec<_>>>()?;
                (clause, params)
            }
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY rowid",
            select_list,
            quote_ident(&self.table),
            clause
        );
        Ok((sql, params))
    }
}

impl RecordSource for SqliteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, selection: &Selection, projection: &Projection) -> Result<RecordIter<'_>> {
        let (sql, params) = self.build_query(selection, projection)?;
        tracing::debug!(
            component = module_path!(),
            op = "query",
            source = self.name.as_str(),
            sql = sql.as_str(),
            "sqlite query"
        );

        let query_error = |e: rusqlite::Error| match selection.as_value() {
            Value::String(_) => invalid_selection(&self.name, &e.to_string()),
            _ => from_rusqlite(e).with_source_name(self.name.as_str()),
        };

        let mut stmt = self.conn.prepare(&sql).map_err(query_error)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                let mut map = Map::new();
                for (index, name) in names.iter().enumerate() {
                    if name == "__recdiff_empty" {
                        continue;
                    }
                    map.insert(name.clone(), from_sql_value(index, row.get_ref(index)?)?);
                }
                Ok(Record::from(map))
            })
            .map_err(query_error)?;

        let records: Vec<Result<Record>> = rows
            .map(|row| row.map_err(|e| from_rusqlite(e).with_source_name(self.name.as_str())))
            .collect();
        Ok(Box::new(records.into_iter()))
    }
}

fn to_sql_value(source_name: &str, value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            (None, None) => {
                return Err(invalid_selection(
                    source_name,
                    &format!("number {} is out of range for SQLite", n),
                ))
            }
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    })
}

fn from_sql_value(index: usize, value: ValueRef<'_>) -> rusqlite::Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(_) => {
            let text = value.as_str().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
            })?;
            Value::String(text.to_string())
        }
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    })
}
