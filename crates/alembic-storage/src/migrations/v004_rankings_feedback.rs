//! v004: ranking records and append-only feedback events.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS ranking_records (
            artifact_id     TEXT PRIMARY KEY,
            factors         TEXT,
            aggregate       REAL NOT NULL,
            source          TEXT NOT NULL,
            weight_version  INTEGER,
            computed_at     TEXT NOT NULL,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS feedback_events (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            artifact_id  TEXT NOT NULL,
            kind         TEXT NOT NULL,
            value        REAL NOT NULL,
            created_at   TEXT NOT NULL,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_artifact ON feedback_events(artifact_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
