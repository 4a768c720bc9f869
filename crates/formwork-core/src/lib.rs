//! # formwork-core
//!
//! Core types shared by every formwork crate. This crate has no framework
//! dependencies and provides the foundation for the model, form, and view
//! layers.
//!
//! ## Modules
//!
//! - [`error`] - The [`FormworkError`] taxonomy and single-rule [`ValidationError`]
//! - [`error_set`] - [`ErrorSet`], the ordered field-keyed error collection
//! - [`settings`] - Framework settings with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod error_set;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormworkError, FormworkResult, ValidationError};
pub use error_set::{ErrorEntry, ErrorSet, BASE_KEY};
pub use settings::Settings;
