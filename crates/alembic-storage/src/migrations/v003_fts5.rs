//! v003: FTS5 index over artifact content and tags, with sync triggers.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        CREATE VIRTUAL TABLE IF NOT EXISTS artifact_fts USING fts5(
            content,
            tags,
            content='artifacts',
            content_rowid='rowid'
        );

        CREATE TRIGGER IF NOT EXISTS artifact_fts_insert AFTER INSERT ON artifacts BEGIN
            INSERT INTO artifact_fts(rowid, content, tags)
            VALUES (new.rowid, new.content, new.tags);
        END;

        CREATE TRIGGER IF NOT EXISTS artifact_fts_delete BEFORE DELETE ON artifacts BEGIN
            INSERT INTO artifact_fts(artifact_fts, rowid, content, tags)
            VALUES ('delete', old.rowid, old.content, old.tags);
        END;

        -- Only content and tags are indexed; flag updates must not churn the index.
        CREATE TRIGGER IF NOT EXISTS artifact_fts_update AFTER UPDATE OF content, tags ON artifacts BEGIN
            INSERT INTO artifact_fts(artifact_fts, rowid, content, tags)
            VALUES ('delete', old.rowid, old.content, old.tags);
            INSERT INTO artifact_fts(rowid, content, tags)
            VALUES (new.rowid, new.content, new.tags);
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
