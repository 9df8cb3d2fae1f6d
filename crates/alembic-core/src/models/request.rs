use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Artifact, Phase, RankingRecord};
use crate::errors::ValidationError;

/// How the pipeline reduces generated variants to its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Every artifact from every phase.
    All,
    /// The top-ranked variant of each phase.
    BestPerPhase,
    /// Each phase's winner is the next phase's sole input.
    Cascade,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::BestPerPhase => "best-per-phase",
            Self::Cascade => "cascade",
        }
    }
}

impl std::str::FromStr for SelectionStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "best-per-phase" | "best" => Ok(Self::BestPerPhase),
            "cascade" => Ok(Self::Cascade),
            other => Err(ValidationError::UnknownStrategy {
                name: other.to_string(),
            }),
        }
    }
}

/// A Generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub input: String,
    pub phases: Vec<Phase>,
    /// Signed so that negative counts reach validation instead of wrapping.
    pub variant_count: i32,
    pub strategy: SelectionStrategy,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Pin every phase to this provider (it still falls back on failure).
    pub provider: Option<String>,
    pub persona: Option<String>,
    pub context_hints: Vec<String>,
    pub tags: BTreeSet<String>,
    /// Overall timeout budget; the configured default applies when absent.
    pub timeout_ms: Option<u64>,
}

impl GenerateRequest {
    /// Request running the built-in phases once each with best-per-phase selection.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            phases: Phase::builtin(),
            variant_count: 1,
            strategy: SelectionStrategy::BestPerPhase,
            temperature: None,
            max_tokens: None,
            provider: None,
            persona: None,
            context_hints: Vec::new(),
            tags: BTreeSet::new(),
            timeout_ms: None,
        }
    }

    pub fn with_phases(mut self, phases: Vec<Phase>) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_variants(mut self, count: i32) -> Self {
        self.variant_count = count;
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Reject malformed requests before any provider is touched.
    pub fn validate(&self, max_variants: i32) -> Result<(), ValidationError> {
        if self.input.trim().is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        if self.phases.is_empty() {
            return Err(ValidationError::NoPhases {
                strategy: self.strategy.as_str().to_string(),
            });
        }
        if self.variant_count < 1 || self.variant_count > max_variants {
            return Err(ValidationError::InvalidVariantCount {
                count: self.variant_count,
                max: max_variants,
            });
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ValidationError::InvalidTemperature { value: t });
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ValidationError::InvalidMaxTokens);
        }
        Ok(())
    }
}

/// A variant or phase that failed without failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialFailure {
    pub phase: Phase,
    /// Variant index within the phase; `None` when the whole phase failed.
    pub variant: Option<usize>,
    pub reason: String,
}

/// An artifact returned from Generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub artifact: Artifact,
    pub ranking: Option<RankingRecord>,
    /// False when persistence failed; the content is still valid.
    pub durable: bool,
}

/// Lifecycle of a Generate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RequestState {
    Pending,
    PhaseRunning { index: usize, phase: Phase },
    PhaseComplete { index: usize, phase: Phase },
    Finalizing,
    Done,
    Failed { reason: String },
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// Outcome of a successful Generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub request_id: String,
    pub artifacts: Vec<GeneratedArtifact>,
    pub warnings: Vec<PartialFailure>,
    /// Every state the request passed through, in order.
    pub states: Vec<RequestState>,
}

impl GenerateResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
