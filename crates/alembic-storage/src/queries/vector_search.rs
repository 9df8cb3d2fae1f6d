//! Brute-force cosine search over stored embeddings.
//!
//! Filters run in SQL before any similarity is computed. Vectors whose
//! dimensionality differs from the standard are never compared: they are
//! reported back so the caller can flag them for re-embedding.

use rayon::prelude::*;
use rusqlite::{params_from_iter, Connection};
use tracing::warn;

use alembic_core::errors::{AlembicResult, ValidationError};
use alembic_core::models::{SearchFilter, SearchHit, SearchOptions, SearchOutcome};

use super::artifact_crud::get_artifact;
use super::filter::where_clause;
use crate::codec;
use crate::to_storage_err;

/// A filtered candidate and its decoded vector, if it has a usable one.
pub(crate) struct Candidate {
    pub id: String,
    pub vector: Option<Vec<f32>>,
}

/// Load every candidate passing `filter`.
///
/// With `require_embedding` only artifacts that have a vector are returned.
/// Vectors of the wrong dimensionality or that fail to decode land in the
/// second list instead.
pub(crate) fn load_candidates(
    conn: &Connection,
    filter: &SearchFilter,
    dimensions: usize,
    require_embedding: bool,
) -> AlembicResult<(Vec<Candidate>, Vec<String>)> {
    let join = if require_embedding { "JOIN" } else { "LEFT JOIN" };
    let (clause, params) = where_clause(filter, &[]);
    let sql = format!(
        "SELECT a.id, e.embedding, e.dimensions
         FROM artifacts a {join} artifact_embeddings e ON e.artifact_id = a.id{clause}"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<Vec<u8>>>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut candidates = Vec::new();
    let mut mismatched = Vec::new();
    for row in rows {
        let (id, blob, dims) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let Some(blob) = blob else {
            candidates.push(Candidate { id, vector: None });
            continue;
        };
        // Skip mismatches without decoding the full vector.
        if dims != Some(dimensions as i64) {
            mismatched.push(id);
            continue;
        }
        match codec::decode(&id, &blob) {
            Ok(vector) if vector.len() == dimensions => candidates.push(Candidate {
                id,
                vector: Some(vector),
            }),
            Ok(_) => mismatched.push(id),
            Err(e) => {
                warn!(artifact_id = %id, error = %e, "unreadable embedding, flagging");
                mismatched.push(id);
            }
        }
    }
    Ok((candidates, mismatched))
}

pub(crate) fn validate_query(
    query: &[f32],
    dimensions: usize,
    options: &SearchOptions,
) -> AlembicResult<()> {
    if options.top_k == 0 {
        return Err(ValidationError::InvalidTopK.into());
    }
    if query.len() != dimensions {
        return Err(ValidationError::DimensionMismatch {
            expected: dimensions,
            actual: query.len(),
        }
        .into());
    }
    Ok(())
}

/// Sort by score descending with id as the tiebreak, cut to `top_k`,
/// then materialize the artifacts.
pub(crate) fn finalize_hits(
    conn: &Connection,
    mut scored: Vec<(String, f64, Option<f64>, f64)>,
    top_k: usize,
) -> AlembicResult<Vec<SearchHit>> {
    scored.sort_by(|a, b| b.3.total_cmp(&a.3).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(top_k);

    let mut hits = Vec::with_capacity(scored.len());
    for (id, similarity, lexical, score) in scored {
        if let Some(artifact) = get_artifact(conn, &id)? {
            hits.push(SearchHit {
                artifact,
                similarity,
                lexical,
                score,
            });
        }
    }
    Ok(hits)
}

/// Top-k artifacts by cosine similarity, at or above `options.min_similarity`.
pub fn search_vector(
    conn: &Connection,
    query: &[f32],
    filter: &SearchFilter,
    options: &SearchOptions,
    dimensions: usize,
) -> AlembicResult<SearchOutcome> {
    validate_query(query, dimensions, options)?;
    let (candidates, mismatched) = load_candidates(conn, filter, dimensions, true)?;

    let scored: Vec<(String, f64, Option<f64>, f64)> = candidates
        .par_iter()
        .filter_map(|c| {
            let vector = c.vector.as_ref()?;
            let sim = codec::cosine_similarity(query, vector);
            (sim >= options.min_similarity).then(|| (c.id.clone(), sim, None, sim))
        })
        .collect();

    Ok(SearchOutcome {
        hits: finalize_hits(conn, scored, options.top_k)?,
        mismatched,
    })
}
