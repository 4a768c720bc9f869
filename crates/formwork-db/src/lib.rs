//! # formwork-db
//!
//! The model layer that forms sit on top of. It defines the persistence
//! contract a form graph consumes and nothing more: no query language, no
//! schema management.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`row`] - Result rows and typed extraction via [`FromValue`](row::FromValue)
//! - [`executor`] - The [`DbExecutor`](executor::DbExecutor) trait and record CRUD helpers
//! - [`model`] - The [`ModelAdapter`](model::ModelAdapter) capability contract and associations
//! - [`validators`] - Field validators and per-model rule lists
//! - [`transactions`] - Transaction scopes with explicit rollback requests

// These clippy lints are intentionally allowed for the model crate:
// - doc_markdown: backtick requirements for SQL keywords in docs are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
// - missing_const_for_fn: several accessors will grow non-const bodies
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]

pub mod executor;
pub mod model;
pub mod row;
pub mod transactions;
pub mod validators;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use executor::{count_rows, delete_record, find_by_id, save_record, DbExecutor, Record};
pub use model::{
    downcast_model, model_ref, save_shared, undo_id_on_rollback, AnyModel, Association,
    ModelAdapter, ModelRef,
};
pub use row::{FromValue, Row};
pub use transactions::{atomic, Savepoint, Transaction};
pub use validators::{FieldValidations, Inclusion, Length, Predicate, Presence, Validator};
pub use value::Value;
