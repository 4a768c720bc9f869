//! Settings for formwork.
//!
//! [`Settings`] holds the handful of knobs the form layer and its
//! collaborators read: debug mode and log level for [`logging`](crate::logging),
//! the database the SQLite backend opens, and form reporting options.
//! Every field has a default, so partial configuration files are fine.

use serde::{Deserialize, Serialize};

/// Database connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database file path, or `:memory:` for an in-memory database.
    pub name: String,
    /// Whether to enforce foreign key constraints.
    pub foreign_keys: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            name: ":memory:".to_string(),
            foreign_keys: true,
        }
    }
}

/// Options for form validation reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    /// The error code used when an associated form fails validation.
    pub association_error_code: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            association_error_code: "association_error".to_string(),
        }
    }
}

/// The complete set of framework settings.
///
/// # Examples
///
/// ```
/// use formwork_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// assert_eq!(settings.database.name, ":memory:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "formwork_forms=debug").
    pub log_level: String,
    /// The database configuration.
    pub database: DatabaseSettings,
    /// Form reporting options.
    pub forms: FormSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
            forms: FormSettings::default(),
        }
    }
}
