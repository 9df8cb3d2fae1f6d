//! At most one concurrent execution per phase fingerprint.
//!
//! The first caller for a fingerprint runs the phase; identical callers that
//! arrive while it is in flight wait on the same cell and receive a clone of
//! its result. The entry is dropped once the cell settles, so later
//! identical requests run again.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use alembic_core::errors::AlembicResult;

use super::{PhaseOutcome, PhasePlan};
use crate::phases::PhaseContext;

type Shared = AlembicResult<PhaseOutcome>;

/// Deterministic key over everything that shapes a phase's output.
///
/// The request id is not part of the key: callers sharing a fingerprint
/// share artifacts, including their lineage.
pub fn fingerprint(plan: &PhasePlan, context: &PhaseContext) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut field = |bytes: &[u8]| {
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };
    field(plan.phase.as_str().as_bytes());
    field(plan.strategy.as_str().as_bytes());
    field(plan.provider.as_deref().unwrap_or("").as_bytes());
    field(&(plan.variants as u64).to_le_bytes());
    field(&(plan.tags.len() as u64).to_le_bytes());
    for tag in &plan.tags {
        field(tag.as_bytes());
    }
    field(context.original_input.as_bytes());
    field(context.phase_input.as_bytes());
    field(context.persona.as_deref().unwrap_or("").as_bytes());
    field(&(context.hints.len() as u64).to_le_bytes());
    for hint in &context.hints {
        field(hint.as_bytes());
    }
    field(&context.temperature.to_bits().to_le_bytes());
    field(&context.max_tokens.to_le_bytes());
    field(context.parent_id.as_deref().unwrap_or("").as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[derive(Default)]
pub(crate) struct InflightPhases {
    cells: DashMap<String, Arc<OnceCell<Shared>>>,
}

/// Drops the entry once it is settled, or once nobody else holds it.
/// A cancelled caller leaves an unsettled cell in place when others still
/// wait on it; one of them takes over the run.
struct Release<'a> {
    cells: &'a DashMap<String, Arc<OnceCell<Shared>>>,
    key: &'a str,
    cell: &'a Arc<OnceCell<Shared>>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let cell = self.cell;
        self.cells.remove_if(self.key, |_, current| {
            // Count is stable here: clones happen under the same shard lock.
            Arc::ptr_eq(current, cell) && (cell.initialized() || Arc::strong_count(cell) <= 2)
        });
    }
}

impl InflightPhases {
    pub async fn run<F, Fut>(&self, key: String, run: F) -> Shared
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Shared>,
    {
        let cell = Arc::clone(
            self.cells
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );
        let _release = Release {
            cells: &self.cells,
            key: &key,
            cell: &cell,
        };
        cell.get_or_init(run).await.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.cells.len()
    }
}
