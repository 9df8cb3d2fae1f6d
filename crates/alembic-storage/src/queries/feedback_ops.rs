//! Append-only feedback events.

use rusqlite::{params, params_from_iter, Connection, Row};

use alembic_core::errors::{AlembicResult, StorageError};
use alembic_core::models::{FeedbackEvent, FeedbackKind};

use super::artifact_crud::artifact_exists;
use super::{format_ts, parse_ts};
use crate::to_storage_err;

/// SQLite's default host parameter limit is comfortably above this.
const IN_CHUNK: usize = 500;

pub fn insert_feedback(conn: &Connection, event: &FeedbackEvent) -> AlembicResult<i64> {
    if !artifact_exists(conn, &event.artifact_id)? {
        return Err(StorageError::NotFound {
            id: event.artifact_id.clone(),
        }
        .into());
    }
    conn.execute(
        "INSERT INTO feedback_events (artifact_id, kind, value, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.artifact_id,
            event.kind.as_str(),
            event.value,
            format_ts(&event.created_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Events with id greater than `cursor`, oldest first.
pub fn feedback_since(conn: &Connection, cursor: i64, limit: usize) -> AlembicResult<Vec<FeedbackEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, artifact_id, kind, value, created_at
             FROM feedback_events WHERE id > ?1 ORDER BY id LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cursor, limit as i64], |row| Ok(parse_feedback_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(out)
}

/// Every event recorded against any of `ids`, ordered by id.
pub fn feedback_for_artifacts(conn: &Connection, ids: &[String]) -> AlembicResult<Vec<FeedbackEvent>> {
    let mut out = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let sql = format!(
            "SELECT id, artifact_id, kind, value, created_at
             FROM feedback_events WHERE artifact_id IN ({}) ORDER BY id",
            vec!["?"; chunk.len()].join(", ")
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), |row| Ok(parse_feedback_row(row)))
            .map_err(|e| to_storage_err(e.to_string()))?;
        for row in rows {
            out.push(row.map_err(|e| to_storage_err(e.to_string()))??);
        }
    }
    out.sort_by_key(|e| e.id);
    Ok(out)
}

fn parse_feedback_row(row: &Row<'_>) -> AlembicResult<FeedbackEvent> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let id: i64 = row.get(0).map_err(get_err)?;
    let kind: String = row.get(2).map_err(get_err)?;
    let created_at: String = row.get(4).map_err(get_err)?;
    Ok(FeedbackEvent {
        id,
        artifact_id: row.get(1).map_err(get_err)?,
        kind: FeedbackKind::parse(&kind)
            .ok_or_else(|| to_storage_err(format!("feedback {id} has unknown kind '{kind}'")))?,
        value: row.get(3).map_err(get_err)?,
        created_at: parse_ts(&created_at)?,
    })
}
