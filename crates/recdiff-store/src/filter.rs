//! Selection criterion evaluation.
//!
//! File and in-memory sources understand a small document-filter dialect:
//!
//! | Criterion                      | Matches when                          |
//! |--------------------------------|---------------------------------------|
//! | `{"f": v}` / `{"f": {"$eq": v}}` | field present and equal to `v`      |
//! | `{"f": {"$ne": v}}`            | field absent or not equal to `v`      |
//! | `{"f": {"$in": [..]}}`         | field present and equal to a member   |
//! | `{"f": {"$nin": [..]}}`        | field absent or equal to no member    |
//! | `{"f": {"$exists": b}}`        | field presence equals `b`             |
//! | `{"f": {"$gt": v}}` (`$gte`, `$lt`, `$lte`) | ordered comparison of numbers or of strings |
//!
//! Top-level entries are AND-ed; several operators under one field are
//! AND-ed too. A dotted field name (`a.b`) walks nested objects when no
//! top-level field has that exact name. Numbers compare by value, so `1`
//! equals `1.0`.

use crate::db::quote_ident;
use crate::errors::{invalid_selection, Result};
use recdiff_core::{Record, Selection};
use serde_json::{Map, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Compare(Comparison, Value),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Condition::Exists(want), found) => *want == found.is_some(),
            (Condition::Eq(expected), Some(found)) => values_equal(found, expected),
            (Condition::Ne(expected), found) => !found.is_some_and(|f| values_equal(f, expected)),
            (Condition::In(options), Some(found)) => options.iter().any(|o| values_equal(found, o)),
            (Condition::Nin(options), found) => {
                !found.is_some_and(|f| options.iter().any(|o| values_equal(f, o)))
            }
            (Condition::Compare(op, bound), Some(found)) => {
                compare(found, bound).is_some_and(|ordering| op.holds(ordering))
            }
            (Condition::Eq(_) | Condition::In(_) | Condition::Compare(..), None) => false,
        }
    }
}

/// A compiled selection criterion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    /// Compile a selection for `source_name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSelection` for anything other than null or an object,
    /// for unknown `$` operators, and for malformed operator arguments.
    pub fn compile(source_name: &str, selection: &Selection) -> Result<Self> {
        let map = match selection.as_value() {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            Value::String(_) => {
                return Err(invalid_selection(
                    source_name,
                    "text selections are only understood by SQLite sources",
                ))
            }
            other => {
                return Err(invalid_selection(
                    source_name,
                    &format!("selection must be an object, got {}", other),
                ))
            }
        };

        let mut clauses = Vec::new();
        for (field, criterion) in map {
            if field.starts_with('$') {
                return Err(invalid_selection(
                    source_name,
                    &format!("unsupported top-level operator '{}'", field),
                ));
            }
            match criterion {
                Value::Object(ops) if is_operator_doc(ops) => {
                    for (op, arg) in ops {
                        clauses.push((field.clone(), operator(source_name, op, arg)?));
                    }
                }
                value => clauses.push((field.clone(), Condition::Eq(value.clone()))),
            }
        }
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses
            .iter()
            .all(|(field, condition)| condition.matches(lookup(record, field)))
    }

    /// Translate into a SQL `WHERE` body plus positional parameters.
    ///
    /// `columns` lists the table's columns. A field that is not a column is
    /// treated as absent, so the clause collapses to a constant.
    pub fn to_sql(&self, columns: &[String]) -> (String, Vec<Value>) {
        let mut parts = Vec::new();
        let mut params = Vec::new();

        for (field, condition) in &self.clauses {
            let known = columns.iter().any(|c| c == field);
            if !known {
                parts.push(if condition.matches(None) { "1" } else { "0" }.to_string());
                continue;
            }
            let col = quote_ident(field);
            let part = match condition {
                Condition::Exists(want) => if *want { "1" } else { "0" }.to_string(),
                Condition::Eq(Value::Null) => format!("{} IS NULL", col),
                Condition::Eq(value) => {
                    params.push(value.clone());
                    format!("{} = ?", col)
                }
                Condition::Ne(value) => {
                    params.push(value.clone());
                    format!("{} IS NOT ?", col)
                }
                Condition::In(options) if options.is_empty() => "0".to_string(),
                Condition::In(options) => {
                    params.extend(options.iter().cloned());
                    format!("{} IN ({})", col, placeholders(options.len()))
                }
                Condition::Nin(options) if options.is_empty() => "1".to_string(),
                Condition::Nin(options) => {
                    params.extend(options.iter().cloned());
                    format!(
                        "({} IS NULL OR {} NOT IN ({}))",
                        col,
                        col,
                        placeholders(options.len())
                    )
                }
                Condition::Compare(op, bound) => {
                    params.push(bound.clone());
                    format!("{} {} ?", col, op.sql())
                }
            };
            parts.push(part);
        }

        if parts.is_empty() {
            ("1".to_string(), params)
        } else {
            (parts.join(" AND "), params)
        }
    }
}

fn is_operator_doc(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn operator(source_name: &str, op: &str, arg: &Value) -> Result<Condition> {
    let array = |arg: &Value| -> Result<Vec<Value>> {
        arg.as_array().cloned().ok_or_else(|| {
            invalid_selection(source_name, &format!("'{}' expects an array", op))
        })
    };
    Ok(match op {
        "$eq" => Condition::Eq(arg.clone()),
        "$ne" => Condition::Ne(arg.clone()),
        "$in" => Condition::In(array(arg)?),
        "$nin" => Condition::Nin(array(arg)?),
        "$exists" => Condition::Exists(arg.as_bool().ok_or_else(|| {
            invalid_selection(source_name, "'$exists' expects a boolean")
        })?),
        "$gt" => Condition::Compare(Comparison::Gt, arg.clone()),
        "$gte" => Condition::Compare(Comparison::Gte, arg.clone()),
        "$lt" => Condition::Compare(Comparison::Lt, arg.clone()),
        "$lte" => Condition::Compare(Comparison::Lte, arg.clone()),
        other => {
            return Err(invalid_selection(
                source_name,
                &format!("unsupported operator '{}'", other),
            ))
        }
    })
}

/// Find `field` in `record`, walking nested objects for dotted names
pub fn lookup<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(field) {
        return Some(value);
    }
    let mut parts = field.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
