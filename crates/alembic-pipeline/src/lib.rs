//! # alembic-pipeline
//!
//! Orchestration of multi-phase generation on top of the provider, storage,
//! ranking, and learning crates.
//!
//! ## Architecture
//!
//! ```text
//! Alembic (runtime)
//! ├── generate  → Orchestrator
//! │   ├── validate request, resolve phase templates
//! │   ├── per phase: fingerprint → InflightPhases (one run per fingerprint)
//! │   │   └── WorkerPool: N variants under a shared semaphore + deadline
//! │   │       └── variant: generate → usage → embed → persist → rank
//! │   └── strategy: all | best-per-phase | cascade (winner feeds next phase)
//! ├── search / hybrid_search → EmbeddingRouter + IArtifactStore
//! ├── optimize → refine loop over the best version so far
//! ├── record_feedback / train → LearningEngine
//! └── spawn_background → LearningWorker + ReembedWorker (watch shutdown)
//! ```

pub mod maintenance;
mod optimize;
pub mod orchestrator;
pub mod phases;
pub mod runtime;

pub use orchestrator::{fingerprint, PhaseOutcome, PhasePlan};
pub use phases::{PhaseCatalog, PhaseContext, PhaseTemplate};
pub use runtime::{Alembic, BackgroundTasks};
