//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use alembic_core::errors::AlembicResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus, for file-backed databases, a read pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` in memory: separate in-memory connections are separate databases.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> AlembicResult<Self> {
        let writer = WriteConnection::open(path, busy_timeout_ms)?;
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database. Every read goes through the writer.
    pub fn open_in_memory() -> AlembicResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
            db_path: None,
        })
    }
}
