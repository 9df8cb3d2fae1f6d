//! Language-model judge: an alternative ranker that asks a generation
//! provider for a 0–10 verdict.
//!
//! Judge records carry no factor breakdown and no weight version. They do not
//! feed the learning loop.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use alembic_core::constants::JUDGE_SCALE;
use alembic_core::errors::{AlembicResult, ProviderError};
use alembic_core::models::{Artifact, GenerationRequest, RankingRecord, ScoreSource};
use alembic_core::traits::{IRanker, RankingContext};
use alembic_providers::{ProviderRegistry, Routed};

const JUDGE_MAX_TOKENS: u32 = 512;

const DEFAULT_CRITERIA: [&str; 4] = ["clarity", "specificity", "completeness", "conciseness"];

/// Patterns tried in order when the verdict is not valid JSON.
static SCORE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)overall_score\W*(\d+(?:\.\d+)?)",
        r"(?i)score\s*[:=]\s*(\d+(?:\.\d+)?)",
        r"(\d+(?:\.\d+)?)\s*/\s*10",
        r"(?i)(\d+(?:\.\d+)?)\s*out\s*of\s*10",
        r"(\d+(?:\.\d+)?)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Parsed judge output, scores on the 0–10 scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verdict {
    pub overall_score: f64,
    #[serde(default)]
    pub criteria_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub reasoning: String,
}

pub struct JudgeRanker {
    registry: Arc<ProviderRegistry>,
    provider: Option<String>,
    criteria: Vec<String>,
}

impl JudgeRanker {
    pub fn new(registry: Arc<ProviderRegistry>, provider: Option<String>) -> Self {
        Self {
            registry,
            provider,
            criteria: DEFAULT_CRITERIA.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        if !criteria.is_empty() {
            self.criteria = criteria;
        }
        self
    }

    fn build_prompt(&self, artifact: &Artifact, task: Option<&str>) -> String {
        let criteria = self
            .criteria
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n");
        let task = task.unwrap_or("(not specified)");
        format!(
            "Evaluate the following prompt for the task it is meant to serve.\n\n\
             Task: {task}\n\n\
             Prompt:\n\"\"\"\n{}\n\"\"\"\n\n\
             Criteria:\n{criteria}\n\n\
             Score each criterion from 0 to 10, then give an overall score.\n\
             Respond with JSON only:\n\
             {{\"overall_score\": 0.0, \"criteria_scores\": {{\"criterion\": 0.0}}, \"reasoning\": \"...\"}}",
            artifact.content
        )
    }
}

/// Extract a verdict from raw model output.
///
/// Tries the whole text as JSON, then a fenced code block, then the span
/// between the first `{` and the last `}`, then score-like numbers.
pub fn parse_verdict(raw: &str) -> Option<Verdict> {
    let trimmed = raw.trim();
    let mut candidates = vec![trimmed];
    if let Some(block) = fenced_block(trimmed) {
        candidates.push(block);
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            candidates.push(&trimmed[start..=end]);
        }
    }
    for candidate in candidates {
        if let Ok(mut verdict) = serde_json::from_str::<Verdict>(candidate) {
            verdict.overall_score = clamp_score(verdict.overall_score);
            for score in verdict.criteria_scores.values_mut() {
                *score = clamp_score(*score);
            }
            return Some(verdict);
        }
    }

    SCORE_PATTERNS.iter().find_map(|re| {
        let value: f64 = re.captures(trimmed)?.get(1)?.as_str().parse().ok()?;
        Some(Verdict {
            overall_score: clamp_score(value),
            criteria_scores: BTreeMap::new(),
            reasoning: String::new(),
        })
    })
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let end = rest.find("```")?;
    let body = &rest[..end];
    // Drop a language tag such as `json`.
    let body = match body.find('\n') {
        Some(nl) if !body[..nl].contains('{') => &body[nl + 1..],
        _ => body,
    };
    Some(body.trim())
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, JUDGE_SCALE)
    } else {
        0.0
    }
}

#[async_trait]
impl IRanker for JudgeRanker {
    fn name(&self) -> &str {
        "judge"
    }

    async fn score(
        &self,
        artifact: &Artifact,
        context: &RankingContext,
    ) -> AlembicResult<RankingRecord> {
        let request = GenerationRequest {
            prompt: self.build_prompt(artifact, context.task.as_deref()),
            system_prompt: Some(
                "You are a strict, impartial evaluator of prompt quality.".to_string(),
            ),
            temperature: 0.0,
            max_tokens: JUDGE_MAX_TOKENS,
            model: None,
        };
        let Routed {
            value: response,
            provider,
            ..
        } = self
            .registry
            .generate(self.provider.as_deref(), &request)
            .await?;

        let verdict = parse_verdict(&response.content).ok_or_else(|| {
            warn!(artifact_id = %artifact.id, provider = %provider, "judge returned no score");
            ProviderError::MalformedResponse {
                provider: provider.clone(),
                reason: "judge verdict contained no score".to_string(),
            }
        })?;
        debug!(
            artifact_id = %artifact.id,
            provider = %provider,
            overall = verdict.overall_score,
            "judge verdict"
        );

        Ok(RankingRecord {
            artifact_id: artifact.id.clone(),
            factors: None,
            aggregate: verdict.overall_score / JUDGE_SCALE,
            source: ScoreSource::Judge {
                provider,
                reasoning: verdict.reasoning,
            },
            computed_at: context.as_of,
        })
    }
}
