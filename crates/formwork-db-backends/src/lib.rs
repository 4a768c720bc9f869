//! # formwork-db-backends
//!
//! Database backend implementations for formwork. Each backend implements
//! [`DbExecutor`](formwork_db::DbExecutor), so models, forms, and
//! transaction scopes run against it unchanged.
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, enabled by default)

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
