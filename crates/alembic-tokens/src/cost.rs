//! Usage and cost estimates for a completed generation.

use alembic_core::models::{GenerationResponse, ProviderDescriptor};

use crate::TokenCounter;

/// Token usage and the cost it implies on a given provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageEstimate {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
}

/// Prefer backend-reported usage; count locally what the backend left out.
pub fn estimate_usage(
    counter: &TokenCounter,
    descriptor: &ProviderDescriptor,
    prompt: &str,
    response: &GenerationResponse,
) -> UsageEstimate {
    let input_tokens = response
        .input_tokens
        .unwrap_or_else(|| saturating_u32(counter.count_cached(prompt)));
    let output_tokens = response
        .output_tokens
        .unwrap_or_else(|| saturating_u32(counter.count_cached(&response.content)));
    let cost = descriptor.estimate_cost(input_tokens.saturating_add(output_tokens));
    UsageEstimate {
        input_tokens,
        output_tokens,
        cost,
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
