//! # formwork-test
//!
//! Testing utilities for formwork. Provides [`TestDatabase`], an in-memory
//! SQLite database with a query counter, and the [`fixtures`] module: a
//! small person/country/pet domain with its forms and schema, shared by the
//! integration tests and the demo.

pub mod fixtures;
#[cfg(feature = "sqlite")]
pub mod test_database;

#[cfg(feature = "sqlite")]
pub use test_database::TestDatabase;
