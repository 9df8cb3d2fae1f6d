//! v006: per-run counts of skipped events and ids of quarantined ones.

use rusqlite::Connection;

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AlembicResult<()> {
    conn.execute_batch(
        "
        ALTER TABLE training_runs ADD COLUMN skipped INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE training_runs ADD COLUMN quarantined TEXT NOT NULL DEFAULT '[]';
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
