//! Differ configuration files
//!
//! Reads a [`DifferConfig`] from YAML, TOML or JSON, chosen by file
//! extension, and validates it before handing it out.

#![allow(clippy::result_large_err)]

use crate::errors::{config_validation, io_error, Result};
use recdiff_core::{log_op_end, log_op_error, log_op_start, DifferConfig};
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick a format from the path's extension
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unknown or missing extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(config_validation(&format!(
                "cannot tell config format of {} (expected .yaml, .yml, .toml or .json)",
                path.display()
            ))),
        }
    }
}

/// Load and validate a config file
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `InvalidConfig` if it does not
/// parse (including malformed delta rules) or fails validation.
pub fn load_config(path: &Path) -> Result<DifferConfig> {
    log_op_start!("load_config", path = %path.display());
    let start = Instant::now();

    let result = ConfigFormat::from_path(path).and_then(|format| {
        let content = fs::read_to_string(path).map_err(|e| io_error("load_config", e))?;
        parse_config_str(&content, format)
    });

    match &result {
        Ok(config) => {
            log_op_end!(
                "load_config",
                duration_ms = start.elapsed().as_millis() as u64,
                key = config.key.as_str(),
                deltas = config.deltas.len() as u64
            );
        }
        Err(err) => {
            log_op_error!(
                "load_config",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result
}

/// Parse and validate config text
///
/// # Errors
///
/// Returns `InvalidConfig` on parse or validation failure.
pub fn parse_config_str(content: &str, format: ConfigFormat) -> Result<DifferConfig> {
    let config: DifferConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| config_validation(&format!("YAML parse error: {}", e)))?,
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| config_validation(&format!("TOML parse error: {}", e)))?,
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| config_validation(&format!("JSON parse error: {}", e)))?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdiff_core::ExErrorKind;
    use serde_json::json;

    #[test]
    fn test_yaml() {
        let config = parse_config_str(
            "key: task_id\nprops: [formula]\ninfo: [label]\nfilter:\n  state: successful\ndeltas:\n  energy: '+-0.01'\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.key, "task_id");
        assert_eq!(config.filter.as_value(), &json!({"state": "successful"}));
        assert_eq!(config.deltas["energy"].dx(), 0.01);
    }

    #[test]
    fn test_toml() {
        let config = parse_config_str(
            "key = \"id\"\nprops = [\"a\"]\n\n[filter]\nn = { \"$gt\" = 2 }\n\n[deltas]\nx = \"+1-2=%\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert!(config.deltas["x"].is_percent());
        assert_eq!(config.filter.as_value(), &json!({"n": {"$gt": 2}}));
    }

    #[test]
    fn test_bad_delta_is_config_error() {
        let err =
            parse_config_str("{\"deltas\": {\"e\": \"+5-\"}}", ConfigFormat::Json).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
        assert!(err.message().contains("Bad syntax for delta '+5-': +X-"), "{}", err);
    }

    #[test]
    fn test_validation_applied() {
        let err = parse_config_str("key: ''\n", ConfigFormat::Yaml).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("d.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("d.toml")).unwrap(), ConfigFormat::Toml);
        assert!(ConfigFormat::from_path(Path::new("d.ini")).is_err());
    }
}
