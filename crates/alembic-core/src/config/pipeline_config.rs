use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// A user-declared phase with its own prompt template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTemplateConfig {
    pub name: String,
    pub system_prompt: String,
    /// Template text; `{{INPUT}}` and `{{PROMPT}}` are substituted.
    pub template: String,
}

/// Orchestration pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on concurrent outbound provider calls.
    pub worker_pool_size: usize,
    pub request_timeout_ms: u64,
    pub phase_timeout_ms: u64,
    pub default_variant_count: i32,
    pub max_variant_count: i32,
    pub default_temperature: f64,
    pub default_max_tokens: u32,
    /// Preferred provider per phase name.
    pub phase_providers: BTreeMap<String, String>,
    pub custom_phases: Vec<PhaseTemplateConfig>,
    pub optimize_max_iterations: u32,
    pub optimize_target_score: f64,
    /// Add the best ranked similar past artifacts to each request's hints.
    pub history_enhancement: bool,
    /// Similar artifacts fetched before ranking them.
    pub history_candidates: usize,
    /// Examples kept as hints.
    pub history_examples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: defaults::DEFAULT_WORKER_POOL_SIZE,
            request_timeout_ms: defaults::DEFAULT_REQUEST_TIMEOUT_MS,
            phase_timeout_ms: defaults::DEFAULT_PHASE_TIMEOUT_MS,
            default_variant_count: defaults::DEFAULT_VARIANT_COUNT,
            max_variant_count: defaults::DEFAULT_MAX_VARIANT_COUNT,
            default_temperature: defaults::DEFAULT_TEMPERATURE,
            default_max_tokens: defaults::DEFAULT_MAX_TOKENS,
            phase_providers: BTreeMap::new(),
            custom_phases: Vec::new(),
            optimize_max_iterations: defaults::DEFAULT_OPTIMIZE_MAX_ITERATIONS,
            optimize_target_score: defaults::DEFAULT_OPTIMIZE_TARGET_SCORE,
            history_enhancement: false,
            history_candidates: defaults::DEFAULT_HISTORY_CANDIDATES,
            history_examples: defaults::DEFAULT_HISTORY_EXAMPLES,
        }
    }
}
