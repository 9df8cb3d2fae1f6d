//! # alembic-learning
//!
//! Adjusts ranking weights from accumulated feedback. Each run reads events
//! past the training cursor, correlates every factor with positive outcomes,
//! moves each weight by a bounded step, and publishes the result as a new
//! version. Failed runs leave the active weights alone; out-of-range events
//! are quarantined in the run log.

pub mod correlation;
pub mod engine;
pub mod worker;

pub use engine::{bootstrap_weights, LearningEngine};
pub use worker::LearningWorker;
