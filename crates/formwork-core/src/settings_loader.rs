//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMWORK_DEBUG` | `debug` |
//! | `FORMWORK_LOG_LEVEL` | `log_level` |
//! | `FORMWORK_DATABASE_NAME` | `database.name` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formwork_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("formwork.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::FormworkError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys missing from the document keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormworkError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormworkError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormworkError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormworkError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormworkError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormworkError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormworkError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `FORMWORK_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `FORMWORK_LOG_LEVEL` -> `log_level`
/// - `FORMWORK_DATABASE_NAME` -> `database.name`
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMWORK_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMWORK_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMWORK_DATABASE_NAME") {
        settings.database.name = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, FormworkError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormworkError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, FormworkError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormworkError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormworkError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "formwork_forms=debug"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "formwork_forms=debug");
        // Defaults preserved
        assert_eq!(settings.database.name, ":memory:");
    }

    #[test]
    fn test_from_toml_str_nested_tables() {
        let toml = r#"
            [database]
            name = "people.sqlite3"

            [forms]
            association_error_code = "invalid_nested"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.database.name, "people.sqlite3");
        // Sibling key inside a partially overridden table keeps its default
        assert!(settings.database.foreign_keys);
        assert_eq!(settings.forms.association_error_code, "invalid_nested");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("debug = = true").unwrap_err();
        assert!(matches!(err, FormworkError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("debug = \"sometimes\"").unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_from_json_str() {
        let settings = from_json_str(r#"{"database": {"foreign_keys": false}}"#).unwrap();
        assert!(!settings.database.foreign_keys);
        assert_eq!(settings.database.name, ":memory:");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        let settings = from_toml_file(file.path()).unwrap();
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"debug\": false}}").unwrap();
        let settings = from_json_file(file.path()).unwrap();
        assert!(!settings.debug);
    }

    #[test]
    fn test_missing_file() {
        let err = from_toml_file("/nonexistent/formwork.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_merge_json_override_scalar() {
        let merged = merge_json(serde_json::json!({"a": 1, "b": 2}), serde_json::json!({"b": 3}));
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 3}));
    }
}
