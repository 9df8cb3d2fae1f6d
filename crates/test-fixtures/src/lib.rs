//! Shared test doubles and fixture loaders for the Alembic workspace.
//!
//! `ScriptedProvider` stands in for a real backend: deterministic output,
//! call counters, and switchable failure, latency, and health.

mod builders;
mod scripted;

pub use builders::{artifact, unit_vector, ArtifactBuilder};
pub use scripted::ScriptedProvider;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Root directory of the fixture data folder.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load a fixture file as a string.
///
/// # Panics
/// Panics if the file doesn't exist.
pub fn load_fixture_str(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture_str(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", relative_path, e))
}
