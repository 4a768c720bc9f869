//! Transaction scopes.
//!
//! [`atomic`] runs a closure inside a [`Transaction`]. The transaction is the
//! single atomic persistence boundary for everything written through it:
//!
//! - the closure returns `Ok` → COMMIT
//! - the closure returns `Ok` after calling [`Transaction::set_rollback`] →
//!   ROLLBACK, and the closure's value is still returned normally
//! - the closure returns `Err` → ROLLBACK, and the error is returned
//! - the transaction is dropped unfinished (e.g. while unwinding) → ROLLBACK
//!
//! Every rollback runs the callbacks registered with
//! [`DbExecutor::on_rollback`] in reverse registration order, which is how
//! ids assigned by rolled-back inserts are cleared again.
//!
//! Opening a transaction on an executor that is itself a transaction creates
//! a savepoint instead, so nested scopes roll back independently.
//!
//! # Examples
//!
//! ```ignore
//! use formwork_db::transactions::atomic;
//!
//! let saved = atomic(&db, |txn| {
//!     let ok = person.save(txn);
//!     if !ok {
//!         txn.set_rollback();
//!     }
//!     Ok(ok)
//! })?;
//! ```

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};

use formwork_core::FormworkResult;

use crate::executor::DbExecutor;
use crate::row::Row;
use crate::value::Value;

/// Counter for generating unique savepoint names.
static SAVEPOINT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A named savepoint inside an enclosing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    /// The unique name of this savepoint.
    pub name: String,
}

impl Savepoint {
    /// Creates a new savepoint with an auto-generated unique name.
    pub fn new() -> Self {
        let id = SAVEPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("sp_{id}"),
        }
    }
}

impl Default for Savepoint {
    fn default() -> Self {
        Self::new()
    }
}

type Callbacks = Vec<Box<dyn FnOnce()>>;

/// An open transaction (or savepoint) on a [`DbExecutor`].
///
/// `Transaction` implements `DbExecutor` itself, so anything that writes
/// through an executor can write inside the scope.
pub struct Transaction<'a> {
    db: &'a dyn DbExecutor,
    depth: u32,
    savepoint: Option<Savepoint>,
    rollback_requested: Cell<bool>,
    finished: Cell<bool>,
    on_commit_callbacks: RefCell<Callbacks>,
    on_rollback_callbacks: RefCell<Callbacks>,
}

impl<'a> Transaction<'a> {
    /// Opens a transaction, or a savepoint if `db` is already inside one.
    ///
    /// # Errors
    ///
    /// Returns an error if BEGIN or SAVEPOINT fails.
    pub fn begin(db: &'a dyn DbExecutor) -> FormworkResult<Self> {
        let outer_depth = db.transaction_depth();
        let savepoint = if outer_depth == 0 {
            db.execute_sql("BEGIN", &[])?;
            None
        } else {
            let sp = Savepoint::new();
            db.execute_sql(&format!("SAVEPOINT {}", sp.name), &[])?;
            Some(sp)
        };
        tracing::debug!(depth = outer_depth + 1, "transaction opened");

        Ok(Self {
            db,
            depth: outer_depth + 1,
            savepoint,
            rollback_requested: Cell::new(false),
            finished: Cell::new(false),
            on_commit_callbacks: RefCell::new(Vec::new()),
            on_rollback_callbacks: RefCell::new(Vec::new()),
        })
    }

    /// Returns the nesting depth (1 for the outermost transaction).
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns `true` if this is the outermost transaction, not a savepoint.
    pub const fn is_outermost(&self) -> bool {
        self.savepoint.is_none()
    }

    /// Requests that the scope be rolled back when the block finishes,
    /// even though the block itself returns normally.
    pub fn set_rollback(&self) {
        self.rollback_requested.set(true);
    }

    /// Returns `true` if [`set_rollback`](Self::set_rollback) was called.
    pub fn needs_rollback(&self) -> bool {
        self.rollback_requested.get()
    }

    /// Returns the number of pending on-commit callbacks.
    pub fn pending_callbacks(&self) -> usize {
        self.on_commit_callbacks.borrow().len()
    }

    /// Returns the number of pending on-rollback callbacks.
    pub fn pending_rollback_callbacks(&self) -> usize {
        self.on_rollback_callbacks.borrow().len()
    }

    /// Commits the transaction or releases the savepoint.
    ///
    /// On-commit callbacks run after the outermost COMMIT, and on-rollback
    /// callbacks are discarded there. A released savepoint hands both kinds
    /// to the enclosing transaction, which may still roll back.
    ///
    /// # Errors
    ///
    /// Returns an error if COMMIT or RELEASE fails; the transaction is then
    /// rolled back when dropped.
    pub fn commit(self) -> FormworkResult<()> {
        match &self.savepoint {
            None => self.db.execute_sql("COMMIT", &[])?,
            Some(sp) => self
                .db
                .execute_sql(&format!("RELEASE SAVEPOINT {}", sp.name), &[])?,
        };
        self.finished.set(true);
        tracing::debug!(depth = self.depth, "transaction committed");

        let callbacks = std::mem::take(&mut *self.on_commit_callbacks.borrow_mut());
        let undo = std::mem::take(&mut *self.on_rollback_callbacks.borrow_mut());
        if self.is_outermost() {
            for cb in callbacks {
                cb();
            }
        } else {
            for cb in callbacks {
                self.db.on_commit(cb);
            }
            for cb in undo {
                self.db.on_rollback(cb);
            }
        }
        Ok(())
    }

    /// Rolls back the transaction or the savepoint, discarding every write
    /// made through it and its pending on-commit callbacks, then runs its
    /// on-rollback callbacks newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if ROLLBACK fails.
    pub fn rollback(self) -> FormworkResult<()> {
        self.finished.set(true);
        self.on_commit_callbacks.borrow_mut().clear();
        let result = self.rollback_statements();
        self.run_rollback_callbacks();
        result?;
        tracing::info!(depth = self.depth, "transaction rolled back");
        Ok(())
    }

    fn run_rollback_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.on_rollback_callbacks.borrow_mut());
        for cb in callbacks.into_iter().rev() {
            cb();
        }
    }

    fn rollback_statements(&self) -> FormworkResult<()> {
        match &self.savepoint {
            None => {
                self.db.execute_sql("ROLLBACK", &[])?;
            }
            Some(sp) => {
                self.db
                    .execute_sql(&format!("ROLLBACK TO SAVEPOINT {}", sp.name), &[])?;
                self.db
                    .execute_sql(&format!("RELEASE SAVEPOINT {}", sp.name), &[])?;
            }
        }
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished.get() {
            return;
        }
        self.on_commit_callbacks.borrow_mut().clear();
        let result = self.rollback_statements();
        self.run_rollback_callbacks();
        if let Err(e) = result {
            tracing::error!(error = %e, "rollback of an abandoned transaction failed");
        } else {
            tracing::warn!(depth = self.depth, "abandoned transaction rolled back");
        }
    }
}

impl DbExecutor for Transaction<'_> {
    fn execute_sql(&self, sql: &str, params: &[Value]) -> FormworkResult<u64> {
        self.db.execute_sql(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> FormworkResult<Vec<Row>> {
        self.db.query(sql, params)
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> FormworkResult<Row> {
        self.db.query_one(sql, params)
    }

    fn insert_returning_id(&self, sql: &str, params: &[Value]) -> FormworkResult<i64> {
        self.db.insert_returning_id(sql, params)
    }

    fn transaction_depth(&self) -> u32 {
        self.depth
    }

    fn on_commit(&self, callback: Box<dyn FnOnce()>) {
        self.on_commit_callbacks.borrow_mut().push(callback);
    }

    fn on_rollback(&self, callback: Box<dyn FnOnce()>) {
        self.on_rollback_callbacks.borrow_mut().push(callback);
    }
}

/// Executes a closure within a transaction scope.
///
/// See the [module documentation](self) for the commit/rollback rules.
///
/// # Errors
///
/// Returns the closure's error (after rolling back), or an error from
/// BEGIN/COMMIT/ROLLBACK.
pub fn atomic<'a, T, F>(db: &'a dyn DbExecutor, f: F) -> FormworkResult<T>
where
    F: FnOnce(&Transaction<'a>) -> FormworkResult<T>,
{
    let txn = Transaction::begin(db)?;

    match f(&txn) {
        Ok(value) if txn.needs_rollback() => {
            txn.rollback()?;
            Ok(value)
        }
        Ok(value) => {
            txn.commit()?;
            Ok(value)
        }
        Err(e) => {
            // Report the original failure even if the rollback itself fails
            if let Err(rollback_err) = txn.rollback() {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
