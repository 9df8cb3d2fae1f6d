//! Ranking record persistence. A newer record for the same artifact replaces the old one.

use rusqlite::{params, Connection, OptionalExtension};

use alembic_core::errors::AlembicResult;
use alembic_core::models::{FactorScores, RankingRecord, ScoreSource};

use super::{format_ts, parse_ts};
use crate::to_storage_err;

pub fn save_ranking(conn: &Connection, record: &RankingRecord) -> AlembicResult<()> {
    let factors = record
        .factors
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let source = serde_json::to_string(&record.source)?;
    conn.execute(
        "INSERT INTO ranking_records (artifact_id, factors, aggregate, source, weight_version, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(artifact_id) DO UPDATE SET
            factors = excluded.factors,
            aggregate = excluded.aggregate,
            source = excluded.source,
            weight_version = excluded.weight_version,
            computed_at = excluded.computed_at",
        params![
            record.artifact_id,
            factors,
            record.aggregate,
            source,
            record.weight_version().map(|v| v as i64),
            format_ts(&record.computed_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_ranking(conn: &Connection, artifact_id: &str) -> AlembicResult<Option<RankingRecord>> {
    let row = conn
        .query_row(
            "SELECT factors, aggregate, source, computed_at
             FROM ranking_records WHERE artifact_id = ?1",
            params![artifact_id],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((factors, aggregate, source, computed_at)) = row else {
        return Ok(None);
    };
    let factors: Option<FactorScores> = factors
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    let source: ScoreSource = serde_json::from_str(&source)?;
    Ok(Some(RankingRecord {
        artifact_id: artifact_id.to_string(),
        factors,
        aggregate,
        source,
        computed_at: parse_ts(&computed_at)?,
    }))
}
