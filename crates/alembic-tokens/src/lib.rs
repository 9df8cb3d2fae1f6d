//! # alembic-tokens
//!
//! Token counting via `tiktoken-rs` (`cl100k_base`), cached per content hash.
//! Falls back to a 4-characters-per-token estimate if the tokenizer cannot load.

pub mod cost;
pub mod counter;

pub use cost::{estimate_usage, UsageEstimate};
pub use counter::TokenCounter;
