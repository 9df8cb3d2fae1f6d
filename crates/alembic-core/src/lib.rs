//! # alembic-core
//!
//! Foundation crate for the Alembic generation orchestration engine.
//! Defines the data model, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AlembicConfig;
pub use errors::{AlembicError, AlembicResult};
pub use models::{Artifact, Phase, RankingRecord, WeightVector};
