//! Per-provider attempts and errors, plus fallback and exhaustion counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMetrics {
    /// Calls made, successful or not.
    pub requests: BTreeMap<String, u64>,
    pub errors: BTreeMap<String, u64>,
    /// Failures rescued by a later provider in the chain.
    pub fallbacks: u64,
    /// Chain walks where every provider failed.
    pub exhausted: u64,
}

impl ProviderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, provider: &str) {
        *self.requests.entry(provider.to_string()).or_default() += 1;
    }

    pub fn record_error(&mut self, provider: &str) {
        *self.requests.entry(provider.to_string()).or_default() += 1;
        *self.errors.entry(provider.to_string()).or_default() += 1;
    }

    pub fn record_fallbacks(&mut self, count: usize) {
        self.fallbacks += count as u64;
    }

    pub fn record_exhausted(&mut self) {
        self.exhausted += 1;
    }

    pub fn error_rate(&self, provider: &str) -> f64 {
        match self.requests.get(provider) {
            Some(&n) if n > 0 => self.errors.get(provider).copied().unwrap_or(0) as f64 / n as f64,
            _ => 0.0,
        }
    }
}
