//! Core error types for formwork.
//!
//! [`FormworkError`] covers every failure a form graph can surface: validation
//! failures on the raising save path, programming errors in form declarations,
//! persistence failures from the model layer, presentation errors, and
//! configuration problems.
//!
//! Expected validation failures are normally *not* errors: they are collected
//! into an [`ErrorSet`] and reported through `is_valid`/`errors`. Only the
//! raising save path turns them into [`FormworkError::ValidationFailed`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::error_set::ErrorSet;

/// A single failed validation rule.
///
/// Validators return this for one value; the caller decides which field key
/// it is filed under when it is added to an [`ErrorSet`].
///
/// # Examples
///
/// ```
/// use formwork_core::error::ValidationError;
///
/// let err = ValidationError::new("is too short (minimum is 2 characters)", "too_short")
///     .with_param("count", "2");
/// assert_eq!(err.code, "too_short");
/// assert_eq!(err.params.get("count").map(String::as_str), Some("2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable message.
    pub message: String,
    /// A short machine-readable code (e.g. "blank", "inclusion").
    pub code: String,
    /// Parameters used to build the message.
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for formwork.
#[derive(Error, Debug)]
pub enum FormworkError {
    // ── Validation ───────────────────────────────────────────────────

    /// A model or form failed validation on a raising save path.
    #[error("Validation failed: {0}")]
    ValidationFailed(ErrorSet),

    // ── Form declaration errors ──────────────────────────────────────

    /// An associated-form declaration names a form class that cannot be resolved.
    #[error("Missing associated form class: {0}")]
    MissingFormClass(String),

    /// A non-collection association was indexed like a collection.
    #[error("Trying to access association '{association}' like a collection (index {index}) even though it is not one")]
    InvalidAssociationAccess {
        /// The relation name.
        association: String,
        /// The requested index.
        index: usize,
    },

    /// The backing model does not expose the requested association.
    #[error("Model '{model}' has no association named '{association}'")]
    UnknownAssociation {
        /// The model name.
        model: String,
        /// The relation name.
        association: String,
    },

    // ── Persistence errors ───────────────────────────────────────────

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A database integrity constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Presentation ─────────────────────────────────────────────────

    /// A presenter was rendered without any view context bound.
    #[error("Cannot render without a view context")]
    NoViewContext,

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormworkError {
    /// Returns `true` for failures raised by the persistence layer.
    pub const fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::IntegrityError(_) | Self::OperationalError(_)
        )
    }

    /// Returns `true` for errors caused by a mistake in form or model
    /// declarations rather than by user input.
    pub const fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFormClass(_)
                | Self::InvalidAssociationAccess { .. }
                | Self::UnknownAssociation { .. }
                | Self::NoViewContext
        )
    }

    /// Returns the validation errors carried by a `ValidationFailed` error.
    pub const fn validation_errors(&self) -> Option<&ErrorSet> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, FormworkError>`.
pub type FormworkResult<T> = Result<T, FormworkError>;
