//! Database executor trait and record CRUD operations.
//!
//! [`DbExecutor`] is the minimal synchronous interface the model layer needs
//! from a backend. Backends (e.g. `SqliteBackend` in `formwork-db-backends`)
//! implement it, and so does [`Transaction`](crate::transactions::Transaction),
//! which lets every write inside a transaction scope go through the same
//! interface.
//!
//! [`Record`] describes how a model maps to one table; [`save_record`],
//! [`delete_record`], and [`find_by_id`] are the CRUD helpers model adapters
//! build their `persist` step on.

use formwork_core::{FormworkError, FormworkResult};

use crate::row::Row;
use crate::value::Value;

/// Minimal synchronous database executor trait.
///
/// Implementors run SQL with positional `?` parameters.
pub trait DbExecutor {
    /// Runs a SQL statement that does not return rows.
    /// Returns the number of rows affected.
    fn execute_sql(&self, sql: &str, params: &[Value]) -> FormworkResult<u64>;

    /// Runs a SQL query and returns all result rows.
    fn query(&self, sql: &str, params: &[Value]) -> FormworkResult<Vec<Row>>;

    /// Runs a SQL query and returns exactly one row.
    fn query_one(&self, sql: &str, params: &[Value]) -> FormworkResult<Row> {
        let mut rows = self.query(sql, params)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(FormworkError::DatabaseError(
                "Expected 1 row, got none".to_string(),
            )),
            n => Err(FormworkError::DatabaseError(format!(
                "Expected 1 row, got {n}"
            ))),
        }
    }

    /// Executes an INSERT and returns the generated row id.
    ///
    /// The default implementation queries `last_insert_rowid()`; backends
    /// with a native mechanism should override it.
    fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FormworkResult<i64> {
        self.execute_sql(sql, params)?;
        let row = self.query_one("SELECT last_insert_rowid() AS id", &[])?;
        row.get::<i64>("id")
    }

    /// Returns how many transaction scopes are open on this executor.
    ///
    /// Plain connections report 0; a [`Transaction`](crate::transactions::Transaction)
    /// reports its nesting depth.
    fn transaction_depth(&self) -> u32 {
        0
    }

    /// Registers a callback to run once the outermost transaction commits.
    ///
    /// Outside a transaction the callback runs immediately.
    fn on_commit(&self, callback: Box<dyn FnOnce()>) {
        callback();
    }

    /// Registers a callback to run if the enclosing transaction (or
    /// savepoint) rolls back. Used to undo in-memory effects of a write,
    /// such as a generated id.
    ///
    /// Outside a transaction a write cannot be rolled back, so the callback
    /// is dropped.
    fn on_rollback(&self, callback: Box<dyn FnOnce()>) {
        drop(callback);
    }
}

/// A model that maps to a single table with an integer primary key `id`.
pub trait Record {
    /// Returns the database table name.
    fn table_name() -> &'static str
    where
        Self: Sized;

    /// Returns the primary key, or `None` if the record was never inserted.
    fn pk(&self) -> Option<i64>;

    /// Sets (or clears) the primary key.
    fn set_pk(&mut self, pk: Option<i64>);

    /// Returns the column/value pairs to write, excluding the primary key.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Builds a record from a result row.
    fn from_row(row: &Row) -> FormworkResult<Self>
    where
        Self: Sized;
}

// ── Record CRUD free functions ─────────────────────────────────────────

/// Saves a record.
///
/// With a primary key set this is an UPDATE of every field; otherwise an
/// INSERT whose generated id is written back with [`Record::set_pk`].
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn save_record<R: Record>(record: &mut R, db: &dyn DbExecutor) -> FormworkResult<()> {
    let fields = record.field_values();
    let table = R::table_name();

    if let Some(pk) = record.pk() {
        if fields.is_empty() {
            return Ok(());
        }
        let assignments: Vec<String> = fields.iter().map(|(name, _)| format!("\"{name}\" = ?")).collect();
        let sql = format!(
            "UPDATE \"{table}\" SET {} WHERE \"id\" = ?",
            assignments.join(", ")
        );
        let mut params: Vec<Value> = fields.into_iter().map(|(_, v)| v).collect();
        params.push(Value::Int(pk));
        db.execute_sql(&sql, &params)?;
        tracing::debug!(table, pk, "updated record");
    } else {
        let sql = if fields.is_empty() {
            format!("INSERT INTO \"{table}\" DEFAULT VALUES")
        } else {
            let columns: Vec<String> = fields.iter().map(|(name, _)| format!("\"{name}\"")).collect();
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!(
                "INSERT INTO \"{table}\" ({}) VALUES ({placeholders})",
                columns.join(", ")
            )
        };
        let params: Vec<Value> = fields.into_iter().map(|(_, v)| v).collect();
        let pk = db.insert_returning_id(&sql, &params)?;
        record.set_pk(Some(pk));
        tracing::debug!(table, pk, "inserted record");
    }

    Ok(())
}

/// Deletes a record by primary key and clears its `pk`.
///
/// Deleting a record that was never saved is a no-op.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_record<R: Record>(record: &mut R, db: &dyn DbExecutor) -> FormworkResult<()> {
    if let Some(pk) = record.pk() {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = ?", R::table_name());
        db.execute_sql(&sql, &[Value::Int(pk)])?;
        record.set_pk(None);
    }
    Ok(())
}

/// Loads a record by primary key.
///
/// # Errors
///
/// Returns an error if the query fails or no row has that id.
pub fn find_by_id<R: Record>(id: i64, db: &dyn DbExecutor) -> FormworkResult<R> {
    let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = ?", R::table_name());
    let row = db.query_one(&sql, &[Value::Int(id)])?;
    R::from_row(&row)
}

/// Counts the rows of a table.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_rows(table: &str, db: &dyn DbExecutor) -> FormworkResult<i64> {
    let row = db.query_one(&format!("SELECT COUNT(*) AS n FROM \"{table}\""), &[])?;
    row.get::<i64>("n")
}
