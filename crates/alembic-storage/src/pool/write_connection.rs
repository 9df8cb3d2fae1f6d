//! Single write connection. Writes are serialized behind one mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use alembic_core::config::defaults::DEFAULT_BUSY_TIMEOUT_MS;
use alembic_core::errors::AlembicResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// A single write connection.
///
/// Held only for the duration of one synchronous closure, so a blocking
/// mutex is safe to take from inside async tasks.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout_ms: u32) -> AlembicResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> AlembicResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, DEFAULT_BUSY_TIMEOUT_MS)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> AlembicResult<T>
    where
        F: FnOnce(&Connection) -> AlembicResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }
}
