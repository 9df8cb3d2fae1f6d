//! Requests, prompts produced, token spend, and per-phase wall time.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Samples kept per phase.
const MAX_PHASE_SAMPLES: usize = 1_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub requests: u64,
    /// Requests that produced no artifact at all.
    pub failed_requests: u64,
    /// Artifacts produced, including refinements.
    pub prompts_generated: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
    /// Phase wall time in milliseconds, newest last.
    phase_samples_ms: BTreeMap<String, Vec<u64>>,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, succeeded: bool) {
        self.requests += 1;
        if !succeeded {
            self.failed_requests += 1;
        }
    }

    /// Record one generated artifact and what it cost.
    pub fn record_prompt(&mut self, input_tokens: u32, output_tokens: u32, cost: f64) {
        self.prompts_generated += 1;
        self.input_tokens += u64::from(input_tokens);
        self.output_tokens += u64::from(output_tokens);
        if cost.is_finite() {
            self.total_cost += cost;
        }
    }

    pub fn record_phase(&mut self, phase: &str, elapsed: Duration) {
        let samples = self.phase_samples_ms.entry(phase.to_string()).or_default();
        samples.push(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        if samples.len() > MAX_PHASE_SAMPLES {
            samples.drain(..samples.len() - MAX_PHASE_SAMPLES);
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn phase_runs(&self, phase: &str) -> usize {
        self.phase_samples_ms.get(phase).map_or(0, Vec::len)
    }

    /// Phase wall time at the given percentile (0.0 to 1.0).
    pub fn phase_latency_percentile(&self, phase: &str, p: f64) -> Duration {
        let Some(samples) = self.phase_samples_ms.get(phase).filter(|s| !s.is_empty()) else {
            return Duration::ZERO;
        };
        let mut sorted = samples.clone();
        sorted.sort_unstable();
        let idx = ((p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize)
            .min(sorted.len() - 1);
        Duration::from_millis(sorted[idx])
    }
}
