//! Schema migrations tracked with `PRAGMA user_version`.

pub mod v001_artifacts;
pub mod v002_embeddings;
pub mod v003_fts5;
pub mod v004_rankings_feedback;
pub mod v005_weights_training;
pub mod v006_training_quarantine;

use rusqlite::Connection;
use tracing::info;

use alembic_core::errors::{AlembicError, AlembicResult, StorageError};

type Migration = fn(&Connection) -> AlembicResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_artifacts::migrate),
    (2, v002_embeddings::migrate),
    (3, v003_fts5::migrate),
    (4, v004_rankings_feedback::migrate),
    (5, v005_weights_training::migrate),
    (6, v006_training_quarantine::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 6;

/// Run all pending migrations. Each one commits together with its version bump.
pub fn run_migrations(conn: &Connection) -> AlembicResult<u32> {
    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let failed = |reason: String| StorageError::MigrationFailed {
            version: *version,
            reason,
        };
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| failed(e.to_string()))?;
        let applied = migrate(conn).and_then(|()| {
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| failed(e.to_string()).into())
        });
        match applied {
            Ok(()) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| failed(e.to_string()))?;
                info!(version, "applied migration");
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(match e {
                    AlembicError::StorageError(StorageError::MigrationFailed { .. }) => e,
                    other => failed(other.to_string()).into(),
                });
            }
        }
    }
    current_version(conn)
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> AlembicResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| {
            StorageError::SqliteError {
                message: e.to_string(),
            }
            .into()
        })
}
