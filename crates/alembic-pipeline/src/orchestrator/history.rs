//! Past artifacts as hints: the best ranked matches for a new input.

use std::cmp::Ordering;

use tracing::{debug, warn};

use alembic_core::config::defaults::HISTORY_EXAMPLE_MAX_CHARS;
use alembic_core::errors::AlembicResult;
use alembic_core::models::{SearchFilter, SearchHit, SearchOptions};

use super::Orchestrator;
use crate::phases::PhaseContext;

impl Orchestrator {
    /// Append up to `history_examples` hints drawn from similar stored
    /// artifacts. Lookup failures leave the context unchanged.
    pub(super) async fn enhance_with_history(&self, context: &mut PhaseContext) {
        match self.history_examples(&context.original_input).await {
            Ok(examples) => {
                debug!(examples = examples.len(), "history hints added");
                context.hints.extend(examples);
            }
            Err(e) => warn!(error = %e, "history enhancement skipped"),
        }
    }

    async fn history_examples(&self, input: &str) -> AlembicResult<Vec<String>> {
        let vector = self.router.embed_query(input).await?;
        let options = SearchOptions {
            top_k: self.pipeline.history_candidates,
            min_similarity: self.embedding.min_similarity,
            lexical_weight: 0.0,
        };
        let outcome = self
            .store
            .search_vector(&vector, &SearchFilter::default(), &options)?;

        let mut scored = Vec::with_capacity(outcome.hits.len());
        for hit in outcome.hits {
            let aggregate = self.store.get_ranking(&hit.artifact.id)?.map(|r| r.aggregate);
            scored.push((aggregate, hit));
        }
        scored.sort_by(by_stored_ranking);
        Ok(scored
            .iter()
            .take(self.pipeline.history_examples)
            .map(|(aggregate, hit)| example_hint(hit, *aggregate))
            .collect())
    }
}

/// Ranked before unranked, higher aggregate first, then closer match, then id.
fn by_stored_ranking(a: &(Option<f64>, SearchHit), b: &(Option<f64>, SearchHit)) -> Ordering {
    match (a.0, b.0) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.1.similarity.total_cmp(&a.1.similarity))
    .then_with(|| a.1.artifact.id.cmp(&b.1.artifact.id))
}

fn example_hint(hit: &SearchHit, aggregate: Option<f64>) -> String {
    let excerpt: String = hit
        .artifact
        .content
        .chars()
        .take(HISTORY_EXAMPLE_MAX_CHARS)
        .collect();
    match aggregate {
        Some(score) => format!(
            "Reference example from {} (scored {score:.2}): {excerpt}",
            hit.artifact.phase
        ),
        None => format!("Reference example from {}: {excerpt}", hit.artifact.phase),
    }
}
