//! Pool of read connections (concurrent, never blocked by the writer via WAL).

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use alembic_core::errors::AlembicResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

/// Maximum number of read connections.
const MAX_POOL_SIZE: usize = 8;

/// A pool of read-only SQLite connections, handed out round-robin.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, pool_size: usize, busy_timeout_ms: u32) -> AlembicResult<Self> {
        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn, busy_timeout_ms)?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the next read connection.
    pub fn with_conn<F, T>(&self, f: F) -> AlembicResult<T>
    where
        F: FnOnce(&Connection) -> AlembicResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx]
            .lock()
            .map_err(|e| to_storage_err(format!("read pool lock poisoned: {e}")))?;
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}
