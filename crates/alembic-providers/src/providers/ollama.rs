//! Ollama local provider.
//!
//! Connects to a local Ollama instance for generation and embeddings.
//! Availability comes from a `/api/tags` health probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alembic_core::errors::ProviderError;
use alembic_core::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};
use alembic_core::traits::IProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::{self, RetryPolicy};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Ollama local provider.
pub struct OllamaProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    client: Client,
    policy: RetryPolicy,
    available: AtomicBool,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
pub(crate) struct OllamaGenerateResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaProvider {
    /// `base_url` defaults to `http://localhost:11434` if `None`.
    pub fn new(
        descriptor: ProviderDescriptor,
        base_url: Option<String>,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            descriptor,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: Client::new(),
            policy: RetryPolicy {
                max_retries,
                backoff,
                timeout,
            },
            available: AtomicBool::new(true),
        }
    }

    /// Check if the Ollama server is reachable and remember the answer.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        let ok = http::probe(&self.client, &url, HEALTH_TIMEOUT).await;
        if ok {
            debug!(model = %self.descriptor.model, "Ollama health check passed");
        } else {
            warn!(base_url = %self.base_url, "Ollama unreachable");
        }
        self.available.store(ok, Ordering::Relaxed);
        ok
    }
}

pub(crate) fn parse_generate_response(
    provider: &str,
    fallback_model: &str,
    resp: OllamaGenerateResponse,
) -> Result<GenerationResponse, ProviderError> {
    if resp.response.trim().is_empty() {
        return Err(ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: "empty response".to_string(),
        });
    }
    Ok(GenerationResponse {
        content: resp.response,
        model: resp.model.unwrap_or_else(|| fallback_model.to_string()),
        input_tokens: resp.prompt_eval_count,
        output_tokens: resp.eval_count,
    })
}

#[async_trait]
impl IProvider for OllamaProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let model = request.model.as_deref().unwrap_or(&self.descriptor.model);
        let body = OllamaGenerateRequest {
            model,
            prompt: &request.prompt,
            system: request.system_prompt.as_deref(),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };
        let url = format!("{}/api/generate", self.base_url);
        let resp = http::post_json::<_, OllamaGenerateResponse>(
            &self.client,
            &self.policy,
            &self.descriptor.name,
            &url,
            &[],
            &body,
        )
        .await?;
        parse_generate_response(&self.descriptor.name, model, resp)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let model = self
            .descriptor
            .embedding_model
            .as_deref()
            .filter(|_| self.descriptor.supports_embeddings)
            .ok_or_else(|| ProviderError::Unsupported {
                provider: self.descriptor.name.clone(),
                capability: "embedding".to_string(),
            })?;
        let url = format!("{}/api/embed", self.base_url);
        let body = OllamaEmbedRequest {
            model,
            input: vec![text],
        };
        let resp = http::post_json::<_, OllamaEmbedResponse>(
            &self.client,
            &self.policy,
            &self.descriptor.name,
            &url,
            &[],
            &body,
        )
        .await?;
        resp.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: self.descriptor.name.clone(),
                reason: "empty embeddings array".to_string(),
            })
    }

    async fn is_available(&self) -> bool {
        self.health_check().await
    }
}
