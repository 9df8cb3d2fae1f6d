//! Anthropic messages API provider. Generation only: embedding requests are
//! rerouted by the registry to a capable fallback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alembic_core::errors::ProviderError;
use alembic_core::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};
use alembic_core::traits::IProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{self, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic HTTP provider.
pub struct AnthropicProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    api_key: Option<String>,
    client: Client,
    policy: RetryPolicy,
    available: AtomicBool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl AnthropicProvider {
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
            descriptor: ProviderDescriptor {
                supports_embeddings: false,
                embedding_model: None,
                ..descriptor
            },
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
}

pub(crate) fn parse_messages_response(
    provider: &str,
    fallback_model: &str,
    resp: MessagesResponse,
) -> Result<GenerationResponse, ProviderError> {
    let content: String = resp
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text)
        .collect::<Vec<_>>()
        .join("");
    if content.trim().is_empty() {
        return Err(ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: "response contained no text blocks".to_string(),
        });
    }
    let (input_tokens, output_tokens) = resp
        .usage
        .map(|u| (u.input_tokens, u.output_tokens))
        .unwrap_or((None, None));
    Ok(GenerationResponse {
        content,
        model: resp.model.unwrap_or_else(|| fallback_model.to_string()),
        input_tokens,
        output_tokens,
    })
}

#[async_trait]
impl IProvider for AnthropicProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::RequestFailed {
                provider: self.descriptor.name.clone(),
                reason: "missing API key".to_string(),
            })?;
        let headers = [
            ("x-api-key", key.clone()),
            ("anthropic-version", API_VERSION.to_string()),
        ];
        let model = request.model.as_deref().unwrap_or(&self.descriptor.model);
        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };
        let url = format!("{}/v1/messages", self.base_url);
        let result = http::post_json::<_, MessagesResponse>(
            &self.client,
            &self.policy,
            &self.descriptor.name,
            &url,
            &headers,
            &body,
        )
        .await
        .and_then(|resp| parse_messages_response(&self.descriptor.name, model, resp));

        match &result {
            Ok(_) => self.available.store(true, Ordering::Relaxed),
            Err(e) if e.is_transient() => self.available.store(false, Ordering::Relaxed),
            Err(_) => {}
        }
        result
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.descriptor.name.clone(),
            capability: "embedding".to_string(),
        })
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
