//! v001: artifacts table.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS artifacts (
            id             TEXT PRIMARY KEY,
            content        TEXT NOT NULL,
            phase          TEXT NOT NULL,
            provider       TEXT NOT NULL,
            model          TEXT NOT NULL,
            request_id     TEXT NOT NULL,
            parent_id      TEXT,
            tags           TEXT NOT NULL DEFAULT '[]',
            temperature    REAL NOT NULL,
            max_tokens     INTEGER NOT NULL,
            input_tokens   INTEGER NOT NULL,
            output_tokens  INTEGER NOT NULL,
            cost           REAL NOT NULL DEFAULT 0,
            duration_ms    INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            content_hash   TEXT NOT NULL,
            needs_reembed  INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_artifacts_phase ON artifacts(phase);
        CREATE INDEX IF NOT EXISTS idx_artifacts_provider ON artifacts(provider);
        CREATE INDEX IF NOT EXISTS idx_artifacts_created ON artifacts(created_at);
        CREATE INDEX IF NOT EXISTS idx_artifacts_request ON artifacts(request_id);
        CREATE INDEX IF NOT EXISTS idx_artifacts_reembed ON artifacts(needs_reembed)
            WHERE needs_reembed = 1;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
