//! Shared HTTP plumbing: retry with exponential backoff and status mapping.

use std::time::Duration;

use alembic_core::errors::ProviderError;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Longest response body excerpt kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Per-provider retry settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// POST a JSON body and decode a JSON response, retrying transient failures.
pub(crate) async fn post_json<B, R>(
    client: &Client,
    policy: &RetryPolicy,
    provider: &str,
    url: &str,
    headers: &[(&str, String)],
    body: &B,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut last_err = None;
    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            tokio::time::sleep(policy.delay_for(attempt)).await;
            debug!(provider, attempt, "retrying provider request");
        }

        let mut request = client.post(url).timeout(policy.timeout).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        match send_once(request, provider, policy.timeout).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() => {
                warn!(provider, attempt, error = %e, "provider request failed");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| ProviderError::RequestFailed {
        provider: provider.to_string(),
        reason: "all retries exhausted".to_string(),
    }))
}

/// GET a URL and report whether it answered with a success status.
pub(crate) async fn probe(client: &Client, url: &str, timeout: Duration) -> bool {
    match client.get(url).timeout(timeout).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

async fn send_once<R: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
    timeout: Duration,
) -> Result<R, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, timeout, &e))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited {
            provider: provider.to_string(),
        });
    }
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Rejected {
            provider: provider.to_string(),
            reason: format!("{status}: {}", excerpt(&body)),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::RequestFailed {
            provider: provider.to_string(),
            reason: format!("{status}: {}", excerpt(&body)),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider, timeout, &e))?;
    serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}

fn transport_error(provider: &str, timeout: Duration, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        ProviderError::RequestFailed {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
