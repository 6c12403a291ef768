//! Differ configuration.
//!
//! A [`DifferConfig`] names the key field, the properties compared for
//! equality, the informational fields carried into the result, the selection
//! forwarded to both sources, and the per-property delta rules. Delta rules
//! are compiled when the configuration is built or deserialized, so a config
//! value that exists always holds valid rules.

use crate::delta::DeltaRule;
use crate::errors::{DiffError, Result};
use crate::extract::ExtractSpec;
use crate::record::{Projection, Selection, IDENTITY_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_key() -> String {
    IDENTITY_FIELD.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DifferConfig {
    /// Field identifying the same logical record in both sources
    #[serde(default = "default_key")]
    pub key: String,

    /// Properties compared for exact equality, in tuple order
    #[serde(default)]
    pub props: Vec<String>,

    /// Fields copied into the result for display only
    #[serde(default)]
    pub info: Vec<String>,

    /// Selection criterion forwarded to both sources
    #[serde(default)]
    pub filter: Selection,

    /// Delta rule per numeric property
    #[serde(default)]
    pub deltas: BTreeMap<String, DeltaRule>,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            props: Vec::new(),
            info: Vec::new(),
            filter: Selection::all(),
            deltas: BTreeMap::new(),
        }
    }
}

impl DifferConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.props = props.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_info<I, S>(mut self, info: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info = info.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, filter: Selection) -> Self {
        self.filter = filter;
        self
    }

    /// Add a delta rule for `property`, compiling `expr`
    ///
    /// # Errors
    ///
    /// Returns `InvalidDelta` when `expr` does not parse.
    pub fn with_delta(mut self, property: impl Into<String>, expr: &str) -> Result<Self> {
        let rule = DeltaRule::parse(expr)?;
        self.deltas.insert(property.into(), rule);
        Ok(self)
    }

    /// Union of equality and delta properties, sorted
    pub fn all_props(&self) -> BTreeSet<&str> {
        self.props
            .iter()
            .map(String::as_str)
            .chain(self.deltas.keys().map(String::as_str))
            .collect()
    }

    /// Fields the differ needs from each source.
    ///
    /// The identity field is explicitly excluded unless it is the key, a
    /// compared property or an info field.
    pub fn projection(&self) -> Projection {
        let fields = self
            .info
            .iter()
            .map(String::as_str)
            .chain(self.all_props())
            .chain(std::iter::once(self.key.as_str()));
        let projection = Projection::new(fields);
        if projection.includes(IDENTITY_FIELD) {
            projection
        } else {
            projection.excluding(IDENTITY_FIELD)
        }
    }

    pub(crate) fn extract_spec(&self, allow_duplicates: bool) -> ExtractSpec {
        ExtractSpec {
            key_field: self.key.clone(),
            numeric: self.deltas.keys().cloned().collect(),
            equality: self.props.clone(),
            info: self.info.clone(),
            allow_duplicates,
        }
    }

    /// Reject configurations that cannot produce a meaningful diff
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty key field, an empty field name,
    /// or a field listed twice in `props` or `info`.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(invalid("key field must not be empty"));
        }
        for (list, fields) in [("props", &self.props), ("info", &self.info)] {
            let mut seen = BTreeSet::new();
            for field in fields {
                if field.trim().is_empty() {
                    return Err(invalid(format!("empty field name in {}", list)));
                }
                if !seen.insert(field.as_str()) {
                    return Err(invalid(format!("field '{}' listed twice in {}", field, list)));
                }
            }
        }
        if self.deltas.keys().any(|p| p.trim().is_empty()) {
            return Err(invalid("empty property name in deltas"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> crate::errors::ExError {
    DiffError::InvalidConfig {
        reason: reason.into(),
    }
    .into()
}
