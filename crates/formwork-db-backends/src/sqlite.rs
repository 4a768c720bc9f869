//! SQLite database backend using `rusqlite`.
//!
//! This module provides the [`SqliteBackend`] which implements the
//! [`DbExecutor`] trait on a single `rusqlite` connection.
//!
//! Features:
//! - In-memory database support via `:memory:` path (great for testing)
//! - Foreign key enforcement controlled by [`DatabaseSettings`]
//! - Simple `Mutex`-based concurrency control
//! - Constraint violations surface as [`FormworkError::IntegrityError`]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use formwork_core::settings::DatabaseSettings;
use formwork_core::{FormworkError, FormworkResult};
use formwork_db::{DbExecutor, Row, Value};

/// A SQLite database backend.
///
/// Uses `rusqlite` for database access with a `Mutex`-guarded connection.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    /// The connection.
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteBackend {
    /// Opens a SQLite database at the given path with foreign keys enforced.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> FormworkResult<Self> {
        Self::open_with(path, true)
    }

    /// Opens the database described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_settings(settings: &DatabaseSettings) -> FormworkResult<Self> {
        Self::open_with(&settings.name, settings.foreign_keys)
    }

    /// Opens an in-memory database (convenience constructor).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> FormworkResult<Self> {
        Self::open(":memory:")
    }

    fn open_with(path: impl Into<PathBuf>, foreign_keys: bool) -> FormworkResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| FormworkError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragma = if foreign_keys {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA foreign_keys=OFF;"
        };
        conn.execute_batch(pragma).map_err(|e| {
            FormworkError::OperationalError(format!("Failed to set pragmas: {e}"))
        })?;
        tracing::debug!(path = %path.display(), foreign_keys, "opened sqlite database");

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a batch of semicolon-separated statements without parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> FormworkResult<()> {
        self.lock()?.execute_batch(sql).map_err(map_error)
    }

    fn lock(&self) -> FormworkResult<MutexGuard<'_, rusqlite::Connection>> {
        self.conn.lock().map_err(|_| {
            FormworkError::OperationalError("SQLite connection lock poisoned".to_string())
        })
    }

    /// Binds `Value`s to a `rusqlite` statement.
    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> FormworkResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Date(d) => stmt.raw_bind_parameter(idx, d.to_string().as_str()),
            }
            .map_err(|e| FormworkError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to our generic `Row`.
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
        let values: Vec<Value> = (0..column_names.len())
            .map(|i| {
                match sqlite_row
                    .get_ref(i)
                    .unwrap_or(rusqlite::types::ValueRef::Null)
                {
                    rusqlite::types::ValueRef::Null => Value::Null,
                    rusqlite::types::ValueRef::Integer(v) => Value::Int(v),
                    rusqlite::types::ValueRef::Real(v) => Value::Float(v),
                    rusqlite::types::ValueRef::Text(b) | rusqlite::types::ValueRef::Blob(b) => {
                        Value::String(String::from_utf8_lossy(b).to_string())
                    }
                }
            })
            .collect();

        Row::new(column_names.to_vec(), values)
    }

    fn run(conn: &rusqlite::Connection, sql: &str, params: &[Value]) -> FormworkResult<u64> {
        let mut stmt = conn.prepare(sql).map_err(map_error)?;
        Self::bind_params(&mut stmt, params)?;
        let count = stmt.raw_execute().map_err(map_error)?;
        tracing::trace!(sql, rows = count, "executed");
        Ok(count as u64)
    }
}

/// Maps a `rusqlite` error onto the formwork taxonomy.
///
/// Constraint violations become integrity errors, busy/locked databases
/// become operational errors, and everything else is a database error.
fn map_error(e: rusqlite::Error) -> FormworkError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            rusqlite::ErrorCode::ConstraintViolation => FormworkError::IntegrityError(e.to_string()),
            rusqlite::ErrorCode::DatabaseBusy
            | rusqlite::ErrorCode::DatabaseLocked
            | rusqlite::ErrorCode::CannotOpen => FormworkError::OperationalError(e.to_string()),
            _ => FormworkError::DatabaseError(e.to_string()),
        },
        _ => FormworkError::DatabaseError(e.to_string()),
    }
}

impl DbExecutor for SqliteBackend {
    fn execute_sql(&self, sql: &str, params: &[Value]) -> FormworkResult<u64> {
        let conn = self.lock()?;
        Self::run(&conn, sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> FormworkResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(map_error)?;

        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        Self::bind_params(&mut stmt, params)?;

        let mut raw_rows = stmt.raw_query();
        let mut rows = Vec::new();
        while let Some(row) = raw_rows.next().map_err(map_error)? {
            rows.push(Self::convert_row(row, &column_names));
        }

        Ok(rows)
    }

    fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FormworkResult<i64> {
        let conn = self.lock()?;
        Self::run(&conn, sql, params)?;
        Ok(conn.last_insert_rowid())
    }
}
