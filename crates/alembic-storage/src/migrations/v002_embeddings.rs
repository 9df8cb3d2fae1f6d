//! v002: one embedding per artifact, with the provenance of the vector.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS artifact_embeddings (
            artifact_id         TEXT PRIMARY KEY,
            embedding           BLOB NOT NULL,
            dimensions          INTEGER NOT NULL,
            model_name          TEXT NOT NULL,
            provider            TEXT NOT NULL,
            requested_provider  TEXT NOT NULL,
            substituted         INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_embeddings_dims ON artifact_embeddings(dimensions);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
