//! # alembic-storage
//!
//! SQLite persistence layer: one serialized writer, a round-robin read pool,
//! `user_version` migrations, brute-force cosine search with rayon, and FTS5
//! for the lexical half of hybrid search.

pub mod codec;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use alembic_core::errors::{AlembicError, StorageError};

/// Helper to convert any error message into a storage error.
pub fn to_storage_err(message: String) -> AlembicError {
    StorageError::SqliteError { message }.into()
}
