//! v005: weight vector history and training run audit.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS weight_versions (
            version           INTEGER PRIMARY KEY,
            temperature       REAL NOT NULL,
            token_efficiency  REAL NOT NULL,
            relevance         REAL NOT NULL,
            historical        REAL NOT NULL,
            reason            TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS training_runs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at   TEXT NOT NULL,
            finished_at  TEXT NOT NULL,
            events_used  INTEGER NOT NULL,
            cursor       INTEGER NOT NULL,
            outcome      TEXT NOT NULL,
            succeeded    INTEGER NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
