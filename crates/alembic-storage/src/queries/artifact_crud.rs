//! Insert-once artifacts, their embeddings, and re-embed flags.

use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::warn;

use alembic_core::errors::{AlembicResult, StorageError};
use alembic_core::models::{
    Artifact, EmbeddingInfo, GenerationMetadata, Lineage, Phase,
};

use super::{format_ts, parse_ts};
use crate::codec;
use crate::to_storage_err;

/// Column list shared by every query that materializes an artifact.
pub(crate) const ARTIFACT_SELECT: &str =
    "SELECT a.id, a.content, a.phase, a.provider, a.model, a.request_id, a.parent_id, a.tags,
            a.temperature, a.max_tokens, a.input_tokens, a.output_tokens, a.cost, a.duration_ms,
            a.created_at, a.content_hash,
            e.embedding, e.model_name, e.provider, e.requested_provider, e.substituted
     FROM artifacts a
     LEFT JOIN artifact_embeddings e ON e.artifact_id = a.id";

/// Insert an artifact and, if present, its embedding in one transaction.
///
/// Artifacts without an embedding, or with one that does not match
/// `dimensions`, are flagged for re-embedding.
pub fn insert_artifact(conn: &Connection, artifact: &Artifact, dimensions: usize) -> AlembicResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_artifact begin: {e}")))?;

    match insert_artifact_inner(&tx, artifact, dimensions) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("insert_artifact commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn insert_artifact_inner(conn: &Connection, artifact: &Artifact, dimensions: usize) -> AlembicResult<()> {
    if artifact_exists(conn, &artifact.id)? {
        return Err(StorageError::AlreadyExists {
            id: artifact.id.clone(),
        }
        .into());
    }
    let tags_json = serde_json::to_string(&artifact.tags)?;
    let conforming = artifact
        .embedding
        .as_ref()
        .is_some_and(|v| v.len() == dimensions);
    let m = &artifact.metadata;

    conn.execute(
        "INSERT INTO artifacts (
            id, content, phase, provider, model, request_id, parent_id, tags,
            temperature, max_tokens, input_tokens, output_tokens, cost, duration_ms,
            created_at, content_hash, needs_reembed
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            artifact.id,
            artifact.content,
            artifact.phase.as_str(),
            artifact.provider,
            artifact.model,
            artifact.lineage.request_id,
            artifact.lineage.parent_id,
            tags_json,
            m.temperature,
            m.max_tokens,
            m.input_tokens,
            m.output_tokens,
            m.cost,
            m.duration_ms as i64,
            format_ts(&artifact.created_at),
            artifact.content_hash,
            !conforming as i32,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    if let (Some(vector), Some(info)) = (&artifact.embedding, &artifact.embedding_info) {
        upsert_embedding(conn, &artifact.id, vector, info)?;
    }
    Ok(())
}

pub fn artifact_exists(conn: &Connection, id: &str) -> AlembicResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM artifacts WHERE id = ?1)",
        params![id],
        |row| row.get::<_, bool>(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_artifact(conn: &Connection, id: &str) -> AlembicResult<Option<Artifact>> {
    let sql = format!("{ARTIFACT_SELECT} WHERE a.id = ?1");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let result = stmt
        .query_row(params![id], |row| Ok(parse_artifact_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    result.transpose()
}

/// Fetch several artifacts, preserving the order of `ids`. Missing ids are skipped.
pub fn get_artifacts(conn: &Connection, ids: &[String]) -> AlembicResult<Vec<Artifact>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(artifact) = get_artifact(conn, id)? {
            out.push(artifact);
        }
    }
    Ok(out)
}

/// Store or replace an artifact's embedding and clear its re-embed flag.
///
/// Wrapped in a SAVEPOINT: the embedding row and the flag change together.
pub fn store_embedding(
    conn: &Connection,
    id: &str,
    vector: &[f32],
    info: &EmbeddingInfo,
) -> AlembicResult<()> {
    if !artifact_exists(conn, id)? {
        return Err(StorageError::NotFound { id: id.to_string() }.into());
    }
    conn.execute_batch("SAVEPOINT store_emb")
        .map_err(|e| to_storage_err(format!("store_embedding savepoint: {e}")))?;

    let result = upsert_embedding(conn, id, vector, info).and_then(|()| {
        conn.execute(
            "UPDATE artifacts SET needs_reembed = 0 WHERE id = ?1",
            params![id],
        )
        .map(|_| ())
        .map_err(|e| to_storage_err(e.to_string()))
    });
    match result {
        Ok(()) => {
            conn.execute_batch("RELEASE store_emb")
                .map_err(|e| to_storage_err(format!("store_embedding release: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO store_emb");
            let _ = conn.execute_batch("RELEASE store_emb");
            Err(e)
        }
    }
}

fn upsert_embedding(
    conn: &Connection,
    id: &str,
    vector: &[f32],
    info: &EmbeddingInfo,
) -> AlembicResult<()> {
    conn.execute(
        "INSERT INTO artifact_embeddings
            (artifact_id, embedding, dimensions, model_name, provider, requested_provider, substituted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(artifact_id) DO UPDATE SET
            embedding = excluded.embedding,
            dimensions = excluded.dimensions,
            model_name = excluded.model_name,
            provider = excluded.provider,
            requested_provider = excluded.requested_provider,
            substituted = excluded.substituted",
        params![
            id,
            codec::encode(vector),
            vector.len() as i64,
            info.model,
            info.provider,
            info.requested_provider,
            info.substituted as i32,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Flag artifacts with no embedding or with one of the wrong dimensionality.
pub fn flag_dimension_mismatches(conn: &Connection, dimensions: usize) -> AlembicResult<usize> {
    conn.execute(
        "UPDATE artifacts SET needs_reembed = 1
         WHERE needs_reembed = 0
           AND (id NOT IN (SELECT artifact_id FROM artifact_embeddings)
                OR id IN (SELECT artifact_id FROM artifact_embeddings WHERE dimensions != ?1))",
        params![dimensions as i64],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn flag_for_reembed(conn: &Connection, ids: &[String]) -> AlembicResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE artifacts SET needs_reembed = 1 WHERE needs_reembed = 0 AND id IN ({})",
        vec!["?"; ids.len()].join(", ")
    );
    conn.execute(&sql, params_from_iter(ids.iter()))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Oldest flagged artifacts first.
pub fn pending_reembed(conn: &Connection, limit: usize) -> AlembicResult<Vec<Artifact>> {
    let sql = format!(
        "{ARTIFACT_SELECT} WHERE a.needs_reembed = 1 ORDER BY a.created_at, a.id LIMIT ?1"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit as i64], |row| Ok(parse_artifact_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(out)
}

/// Parse a row produced by [`ARTIFACT_SELECT`].
pub(crate) fn parse_artifact_row(row: &Row<'_>) -> AlembicResult<Artifact> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let id: String = row.get(0).map_err(get_err)?;
    let tags_json: String = row.get(7).map_err(get_err)?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_json)?;
    let created_at: String = row.get(14).map_err(get_err)?;

    let blob: Option<Vec<u8>> = row.get(16).map_err(get_err)?;
    let decoded = match blob.map(|b| codec::decode(&id, &b)) {
        Some(Ok(vector)) => Some(vector),
        Some(Err(e)) => {
            // Reads as unembedded so the re-embed sweep can repair it.
            warn!(artifact_id = %id, error = %e, "unreadable embedding, treating as missing");
            None
        }
        None => None,
    };
    let (embedding, embedding_info) = match decoded {
        Some(vector) => {
            let info = EmbeddingInfo {
                model: row.get(17).map_err(get_err)?,
                provider: row.get(18).map_err(get_err)?,
                requested_provider: row.get(19).map_err(get_err)?,
                substituted: row.get::<_, i64>(20).map_err(get_err)? != 0,
                dimensions: vector.len(),
            };
            (Some(vector), Some(info))
        }
        None => (None, None),
    };

    Ok(Artifact {
        content: row.get(1).map_err(get_err)?,
        phase: Phase::new(row.get::<_, String>(2).map_err(get_err)?),
        provider: row.get(3).map_err(get_err)?,
        model: row.get(4).map_err(get_err)?,
        lineage: Lineage {
            request_id: row.get(5).map_err(get_err)?,
            parent_id: row.get(6).map_err(get_err)?,
        },
        tags,
        metadata: GenerationMetadata {
            temperature: row.get(8).map_err(get_err)?,
            max_tokens: row.get(9).map_err(get_err)?,
            input_tokens: row.get(10).map_err(get_err)?,
            output_tokens: row.get(11).map_err(get_err)?,
            cost: row.get(12).map_err(get_err)?,
            duration_ms: row.get::<_, i64>(13).map_err(get_err)?.max(0) as u64,
        },
        created_at: parse_ts(&created_at)?,
        content_hash: row.get(15).map_err(get_err)?,
        embedding,
        embedding_info,
        id,
    })
}
