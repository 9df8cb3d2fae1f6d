//! OpenAI-compatible provider (OpenAI, OpenRouter, vLLM, LM Studio, ...).
//!
//! Chat completions for generation, `/embeddings` for vectors. Retries with
//! exponential backoff; marks itself unavailable after exhausting retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alembic_core::errors::ProviderError;
use alembic_core::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};
use alembic_core::traits::IProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{self, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible HTTP provider.
pub struct OpenAiProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    api_key: Option<String>,
    client: Client,
    policy: RetryPolicy,
    available: AtomicBool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    pub fn new(
        descriptor: ProviderDescriptor,
        base_url: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        let available = api_key.is_some();
        Self {
            descriptor,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client: Client::new(),
            policy: RetryPolicy {
                max_retries,
                backoff,
                timeout,
            },
            available: AtomicBool::new(available),
        }
    }

    /// Reset availability (e.g., after a config change).
    pub fn reset_availability(&self) {
        self.available.store(self.api_key.is_some(), Ordering::Relaxed);
    }

    fn auth_headers(&self) -> Result<Vec<(&'static str, String)>, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::RequestFailed {
                provider: self.descriptor.name.clone(),
                reason: "missing API key".to_string(),
            })?;
        Ok(vec![("Authorization", format!("Bearer {key}"))])
    }

    fn track<T>(&self, result: Result<T, ProviderError>) -> Result<T, ProviderError> {
        match &result {
            Ok(_) => self.available.store(true, Ordering::Relaxed),
            Err(e) if e.is_transient() => self.available.store(false, Ordering::Relaxed),
            Err(_) => {}
        }
        result
    }
}

pub(crate) fn parse_chat_response(
    provider: &str,
    fallback_model: &str,
    resp: ChatResponse,
) -> Result<GenerationResponse, ProviderError> {
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: "response contained no completion text".to_string(),
        })?;
    let (input_tokens, output_tokens) = resp
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((None, None));
    Ok(GenerationResponse {
        content,
        model: resp.model.unwrap_or_else(|| fallback_model.to_string()),
        input_tokens,
        output_tokens,
    })
}

pub(crate) fn parse_embed_response(
    provider: &str,
    resp: EmbedResponse,
) -> Result<Vec<f32>, ProviderError> {
    resp.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: "response contained no embedding".to_string(),
        })
}

#[async_trait]
impl IProvider for OpenAiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let headers = self.auth_headers()?;
        let model = request.model.as_deref().unwrap_or(&self.descriptor.model);
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        let body = ChatRequest {
            model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let result = http::post_json::<_, ChatResponse>(
            &self.client,
            &self.policy,
            &self.descriptor.name,
            &url,
            &headers,
            &body,
        )
        .await
        .and_then(|resp| parse_chat_response(&self.descriptor.name, model, resp));
        self.track(result)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let model = match (&self.descriptor.embedding_model, self.descriptor.supports_embeddings) {
            (Some(model), true) => model.clone(),
            _ => {
                return Err(ProviderError::Unsupported {
                    provider: self.descriptor.name.clone(),
                    capability: "embedding".to_string(),
                })
            }
        };
        let headers = self.auth_headers()?;
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbedRequest {
            model: &model,
            input: text,
        };
        let result = http::post_json::<_, EmbedResponse>(
            &self.client,
            &self.policy,
            &self.descriptor.name,
            &url,
            &headers,
            &body,
        )
        .await
        .and_then(|resp| parse_embed_response(&self.descriptor.name, resp));
        self.track(result)
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
