//! OpenAI-compatible provider implementation.
//!
//! [`OpenAiCompatProvider`] works with any API that follows the OpenAI chat
//! completion format. The default target is DashScope's compatible mode,
//! which serves the Qwen models used by the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::types::{ChatRequest, ChatResponse};

/// An LLM provider that uses the OpenAI-compatible chat completion API.
///
/// # Construction
///
/// ```rust,ignore
/// use tutorflow_llm::{LlmProviderConfig, OpenAiCompatProvider};
///
/// let provider = OpenAiCompatProvider::new(LlmProviderConfig::dashscope());
/// ```
pub struct OpenAiCompatProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a new provider from configuration.
    ///
    /// The API key will be resolved from the environment variable specified
    /// in `config.api_key_env` at request time.
    pub fn new(config: LlmProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    /// Create a new provider with an explicit API key.
    ///
    /// This bypasses environment variable lookup.
    pub fn with_api_key(config: LlmProviderConfig, api_key: String) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: Some(api_key),
        }
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }

    /// Returns the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Resolve the API key: explicit key > environment variable.
    fn resolve_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!("set {} env var", self.config.api_key_env))
            })
    }

    /// Turn a non-success response into the matching [`ProviderError`].
    async fn status_error(
        &self,
        request: &ChatRequest,
        response: reqwest::Response,
    ) -> ProviderError {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_ms = parse_retry_after_header(&response);
            let body = response.text().await.unwrap_or_default();

            // Arrears and exhausted free quota also come back as 429 but never
            // clear on their own.
            if is_quota_exhausted(&body) {
                warn!(provider = %self.config.name, "quota exhausted");
                return ProviderError::RequestFailed(
                    extract_error_message(&body)
                        .unwrap_or_else(|| "quota exhausted or account in arrears".into()),
                );
            }

            let retry_after_ms = header_ms
                .or_else(|| parse_retry_after_ms(&body))
                .unwrap_or(1000);
            warn!(
                provider = %self.config.name,
                retry_after_ms,
                "rate limited"
            );
            return ProviderError::RateLimited { retry_after_ms };
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| body.clone());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthFailed(message),
            StatusCode::NOT_FOUND => {
                ProviderError::ModelNotFound(format!("model '{}': {message}", request.model))
            }
            _ => ProviderError::RequestFailed(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_key = self.resolve_api_key()?;
        let url = self.completions_url();

        debug!(
            provider = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let mut req = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs()))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json");

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(request).send().await.map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(self.status_error(request, response).await);
        }

        let bytes = response.bytes().await.map_err(map_send_error)?;
        let chat_response: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse response: {e}"))
        })?;

        debug!(
            provider = %self.config.name,
            model = %chat_response.model,
            choices = chat_response.choices.len(),
            "chat completion response received"
        );

        Ok(chat_response)
    }
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(err)
    }
}

/// Whether a 429 body describes a billing condition rather than throttling.
fn is_quota_exhausted(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("arrearage")
        || lower.contains("insufficient_quota")
        || lower.contains("quota exceeded")
        || lower.contains("free tier")
        || lower.contains("exhausted")
}

/// Extract a human-readable error message from a JSON error body.
///
/// Handles the OpenAI shape `{"error": {"message": ".."}}`, the bare
/// `{"error": ".."}` shape and DashScope's native `{"code": .., "message": ..}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .or_else(|| v.as_str())
        })
        .or_else(|| value.get("message").and_then(|m| m.as_str()))
        .map(String::from)
}

/// Numeric `Retry-After` header, converted to milliseconds.
fn parse_retry_after_header(response: &reqwest::Response) -> Option<u64> {
    let secs: f64 = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()?;
    Some((secs * 1000.0).max(0.0) as u64)
}

/// `retry_after_ms` or `retry_after` (seconds) from a JSON error body.
fn parse_retry_after_ms(body: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("retry_after_ms")
        .and_then(|v| v.as_u64())
        .or_else(|| {
            value
                .get("retry_after")
                .and_then(|v| v.as_f64())
                .map(|secs| (secs * 1000.0) as u64)
        })
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
