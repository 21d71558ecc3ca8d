//! OpenAI-compatible chat provider.
//!
//! Works against any endpoint implementing the OpenAI chat-completions API,
//! including OpenRouter (the default). Each call enforces its own response
//! timeout so a single slow completion cannot consume the whole request
//! budget.

use crate::client::{ChatClient, ChatCompletion, ChatRequest};
use crate::error::LlmError;
use std::time::Duration;

/// Default base URL (OpenRouter's OpenAI-compatible endpoint).
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Fallback per-call timeout when the request does not carry one.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// OpenAI-compatible chat client.
pub struct OpenAiClient {
    /// Base URL of the chat-completions endpoint
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client against the default (OpenRouter) endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let timeout = request
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            timeout_secs = timeout.as_secs(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Body reads can also hit the per-call timeout.
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Transport(e.to_string())
            }
        })?;

        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        tracing::debug!(choices = completion.choices.len(), "Received chat completion");

        Ok(completion)
    }
}
