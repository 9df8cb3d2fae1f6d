//! Weight vector history and training run audit.

use rusqlite::{params, Connection, OptionalExtension, Row};

use alembic_core::errors::{AlembicResult, StorageError};
use alembic_core::models::{TrainingOutcome, TrainingRun, WeightVector};

use super::{format_ts, parse_ts};
use crate::to_storage_err;

const WEIGHT_SELECT: &str = "SELECT version, temperature, token_efficiency, relevance, historical, created_at
     FROM weight_versions";

/// Append a version. Versions are never overwritten.
pub fn save_weight_vector(conn: &Connection, weights: &WeightVector, reason: &str) -> AlembicResult<()> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO weight_versions
                (version, temperature, token_efficiency, relevance, historical, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                weights.version as i64,
                weights.temperature,
                weights.token_efficiency,
                weights.relevance,
                weights.historical,
                reason,
                format_ts(&weights.created_at),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if inserted == 0 {
        return Err(StorageError::AlreadyExists {
            id: format!("weights v{}", weights.version),
        }
        .into());
    }
    Ok(())
}

pub fn latest_weight_vector(conn: &Connection) -> AlembicResult<Option<WeightVector>> {
    let sql = format!("{WEIGHT_SELECT} ORDER BY version DESC LIMIT 1");
    query_one(conn, &sql, params![])
}

pub fn weight_vector(conn: &Connection, version: u64) -> AlembicResult<Option<WeightVector>> {
    let sql = format!("{WEIGHT_SELECT} WHERE version = ?1");
    query_one(conn, &sql, params![version as i64])
}

fn query_one(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> AlembicResult<Option<WeightVector>> {
    conn.query_row(sql, params, |row| Ok(parse_weight_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .transpose()
}

fn parse_weight_row(row: &Row<'_>) -> AlembicResult<WeightVector> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let created_at: String = row.get(5).map_err(get_err)?;
    Ok(WeightVector {
        version: row.get::<_, i64>(0).map_err(get_err)?.max(0) as u64,
        temperature: row.get(1).map_err(get_err)?,
        token_efficiency: row.get(2).map_err(get_err)?,
        relevance: row.get(3).map_err(get_err)?,
        historical: row.get(4).map_err(get_err)?,
        created_at: parse_ts(&created_at)?,
    })
}

pub fn record_training_run(conn: &Connection, run: &TrainingRun) -> AlembicResult<()> {
    let succeeded = !matches!(run.outcome, TrainingOutcome::Failed { .. });
    conn.execute(
        "INSERT INTO training_runs
            (started_at, finished_at, events_used, cursor, outcome, succeeded, skipped, quarantined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            format_ts(&run.started_at),
            format_ts(&run.finished_at),
            run.events_used as i64,
            run.cursor,
            serde_json::to_string(&run.outcome)?,
            succeeded as i32,
            run.skipped as i64,
            serde_json::to_string(&run.quarantined)?,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Highest cursor any run consumed through. A run that holds its batch back
/// records the cursor it started from.
pub fn last_training_cursor(conn: &Connection) -> AlembicResult<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(cursor), 0) FROM training_runs",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
