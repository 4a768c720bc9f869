//! # formwork
//!
//! Form objects over persisted models.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `formwork` to get everything, or depend on individual
//! crates for finer-grained control.

/// Error taxonomy, `ErrorSet`, settings, and logging.
pub use formwork_core as core;

/// The model layer: values, rows, the executor contract, validators, transactions.
pub use formwork_db as db;

/// Database backends: `SQLite`.
pub use formwork_db_backends as db_backends;

/// Forms, associated forms, and the declaration macros.
#[cfg(feature = "forms")]
pub use formwork_forms as forms;

/// Presenters and navigation links.
#[cfg(feature = "views")]
pub use formwork_views as views;

/// Test database and fixtures.
#[cfg(feature = "testing")]
pub use formwork_test as test;

/// Re-exports of third-party crates used in public signatures.
pub mod reexports {
    pub use chrono;
    pub use serde;
    pub use serde_json;
    pub use tracing;
    pub use tracing_subscriber;
}

/// The most commonly used items.
pub mod prelude {
    pub use formwork_core::{ErrorSet, FormworkError, FormworkResult, Settings, BASE_KEY};
    pub use formwork_db::{
        atomic, model_ref, Association, DbExecutor, FieldValidations, ModelAdapter, ModelRef,
        Record, Value,
    };

    #[cfg(feature = "forms")]
    pub use formwork_forms::{
        delegate_association, delegate_attributes, Form, FormBase, FormNode, FormRegistry,
    };

    #[cfg(feature = "views")]
    pub use formwork_views::{Link, Presentable, Presenter, RenderOptions, ViewContext};

    #[cfg(feature = "sqlite")]
    pub use formwork_db_backends::SqliteBackend;
}
