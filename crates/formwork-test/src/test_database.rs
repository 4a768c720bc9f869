//! Test database utilities for formwork.
//!
//! Provides [`TestDatabase`], an in-memory SQLite database wrapper for use in
//! tests. It implements [`DbExecutor`] so forms and records can save into it
//! directly, and adds helpers for creating the fixture schema and counting
//! executed statements.
//!
//! ## Example
//!
//! ```rust
//! use formwork_test::TestDatabase;
//!
//! let db = TestDatabase::new();
//! db.execute_raw("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
//!     .unwrap();
//! assert_eq!(db.count_rows("users").unwrap(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use formwork_core::FormworkResult;
use formwork_db::{DbExecutor, Row, Value};
use formwork_db_backends::SqliteBackend;

use crate::fixtures;

/// An in-memory SQLite database for testing.
///
/// Wraps a [`SqliteBackend`] in an `Arc` so clones share one database, and
/// counts every statement run through it.
///
/// Each `TestDatabase::new()` call creates a fresh database, so tests are
/// fully isolated from each other.
#[derive(Clone)]
pub struct TestDatabase {
    backend: Arc<SqliteBackend>,
    query_count: Arc<AtomicUsize>,
}

impl TestDatabase {
    /// Creates a new in-memory SQLite test database.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory database cannot be created.
    pub fn new() -> Self {
        let backend = SqliteBackend::memory().expect("Failed to create in-memory SQLite database");
        Self {
            backend: Arc::new(backend),
            query_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a test database with the fixture tables already in place.
    ///
    /// The query counter starts at zero.
    ///
    /// # Panics
    ///
    /// Panics if the database or the schema cannot be created.
    pub fn with_fixture_schema() -> Self {
        let db = Self::new();
        db.setup_fixture_schema()
            .expect("Failed to create the fixture schema");
        db.reset_query_count();
        db
    }

    /// Creates the `countries`, `people`, and `pets` tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL execution fails.
    pub fn setup_fixture_schema(&self) -> FormworkResult<()> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.execute_batch(fixtures::SCHEMA)
    }

    /// Drops all user-created tables in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL execution fails.
    pub fn teardown(&self) -> FormworkResult<()> {
        let rows = self.backend.query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            &[],
        )?;

        // Children first so foreign keys never block a drop.
        for row in rows.iter().rev() {
            let table_name: String = row.get("name")?;
            self.backend
                .execute_sql(&format!("DROP TABLE IF EXISTS \"{table_name}\""), &[])?;
        }
        Ok(())
    }

    /// Executes a raw SQL string with no parameters.
    ///
    /// Increments the query counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL execution fails.
    pub fn execute_raw(&self, sql: &str) -> FormworkResult<u64> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.execute_sql(sql, &[])
    }

    /// Counts the rows of `table`. Not counted as a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_rows(&self, table: &str) -> FormworkResult<i64> {
        formwork_db::count_rows(table, self.backend())
    }

    /// Returns the current query count.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    /// Resets the query counter to zero.
    pub fn reset_query_count(&self) {
        self.query_count.store(0, Ordering::Relaxed);
    }

    /// Returns a reference to the inner `SqliteBackend`.
    pub fn backend(&self) -> &SqliteBackend {
        &self.backend
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl DbExecutor for TestDatabase {
    fn execute_sql(&self, sql: &str, params: &[Value]) -> FormworkResult<u64> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.execute_sql(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> FormworkResult<Vec<Row>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.query(sql, params)
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> FormworkResult<Row> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.query_one(sql, params)
    }

    fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FormworkResult<i64> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.backend.insert_returning_id(sql, params)
    }
}
