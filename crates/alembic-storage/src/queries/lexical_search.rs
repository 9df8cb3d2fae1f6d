//! FTS5 lexical scoring and the hybrid blend.

use std::collections::HashMap;

use rayon::prelude::*;
use rusqlite::{params, Connection};

use alembic_core::errors::AlembicResult;
use alembic_core::models::{SearchFilter, SearchOptions, SearchOutcome};

use super::vector_search::{finalize_hits, load_candidates, validate_query};
use crate::codec;
use crate::to_storage_err;

/// Build an FTS5 query matching any alphanumeric term of `text`.
///
/// Terms are quoted so user text can never inject FTS5 syntax.
pub fn fts_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t.to_lowercase()))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// BM25 relevance per matching artifact, normalized so the best match is 1.
pub fn lexical_scores(conn: &Connection, text: &str) -> AlembicResult<HashMap<String, f64>> {
    let Some(query) = fts_query(text) else {
        return Ok(HashMap::new());
    };
    let mut stmt = conn
        .prepare(
            "SELECT a.id, bm25(artifact_fts)
             FROM artifact_fts
             JOIN artifacts a ON a.rowid = artifact_fts.rowid
             WHERE artifact_fts MATCH ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![query], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut raw = Vec::new();
    for row in rows {
        let (id, bm25) = row.map_err(|e| to_storage_err(e.to_string()))?;
        // bm25() is lower-is-better and usually negative.
        raw.push((id, (-bm25).max(0.0)));
    }
    let best = raw.iter().map(|(_, s)| *s).fold(0.0f64, f64::max);
    Ok(raw
        .into_iter()
        .map(|(id, s)| {
            let normalized = if best > 0.0 { s / best } else { 1.0 };
            (id, normalized)
        })
        .collect())
}

/// Blend cosine similarity with lexical relevance.
///
/// `score = (1 - w) * cosine + w * lexical`. Artifacts with no vector yet
/// compete on the lexical half alone; mismatched vectors are excluded.
pub fn search_hybrid(
    conn: &Connection,
    query_text: &str,
    query: &[f32],
    filter: &SearchFilter,
    options: &SearchOptions,
    dimensions: usize,
) -> AlembicResult<SearchOutcome> {
    validate_query(query, dimensions, options)?;
    let w = options.lexical_weight.clamp(0.0, 1.0);
    let lexical = lexical_scores(conn, query_text)?;
    let (candidates, mismatched) = load_candidates(conn, filter, dimensions, false)?;

    let scored: Vec<(String, f64, Option<f64>, f64)> = candidates
        .par_iter()
        .filter_map(|c| {
            let sim = c
                .vector
                .as_ref()
                .map(|v| codec::cosine_similarity(query, v))
                .unwrap_or(0.0);
            let lex = lexical.get(&c.id).copied().unwrap_or(0.0);
            let score = (1.0 - w) * sim + w * lex;
            (score >= options.min_similarity).then(|| (c.id.clone(), sim, Some(lex), score))
        })
        .collect();

    Ok(SearchOutcome {
        hits: finalize_hits(conn, scored, options.top_k)?,
        mismatched,
    })
}
