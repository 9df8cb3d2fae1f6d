//! # alembic-ranking
//!
//! Scores candidate artifacts. The default [`RankingEngine`] is a weighted
//! sum of four deterministic factors read under one [`WeightVector`] snapshot;
//! [`JudgeRanker`] asks a language model instead.
//!
//! [`WeightVector`]: alembic_core::models::WeightVector

pub mod decay;
pub mod factors;
pub mod judge;
pub mod scorer;
pub mod select;
pub mod weights;

pub use judge::JudgeRanker;
pub use scorer::RankingEngine;
pub use select::{best_of, compare_ranked};
pub use weights::WeightStore;
