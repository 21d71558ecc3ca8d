//! Chat client abstraction and request/response types.
//!
//! The wire shape follows the OpenAI chat-completions API:
//! request = `{model, messages[{role, content}], max_tokens, temperature}`,
//! response = `{choices[{message: {content}}]}`. The endpoint is treated as
//! untrusted: every response field the synthesizer reads is optional so that
//! shape deviations deserialize instead of failing, and the caller decides
//! how to degrade.

use crate::error::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user", "assistant")
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "openai/gpt-4o-mini")
    pub model: String,

    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Per-call response timeout (not serialized; enforced by the client)
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl ChatRequest {
    /// Create a new chat request with required fields.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            timeout: None,
        }
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-call response timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Chat completion response.
///
/// All fields are optional on purpose: the synthesizer validates the shape
/// and degrades malformed responses into placeholder answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    /// Completion choices; may be absent or empty
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The assistant message; may be absent
    #[serde(default)]
    pub message: Option<AssistantMessage>,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Generated text; may be absent or empty
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Extract the first choice's trimmed content, if the response carries
    /// a well-formed, non-empty message.
    pub fn first_content(&self) -> Option<&str> {
        let content = self.choices.first()?.message.as_ref()?.content.as_deref()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Trait for chat-completion providers.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Get the provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming chat completion.
    ///
    /// Returns the parsed completion even when its shape is degenerate
    /// (empty choices, absent message); only transport-level and
    /// protocol-level failures surface as `LlmError`.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError>;
}

impl std::fmt::Debug for dyn ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("dyn ChatClient")
            .field("provider", &self.provider_name())
            .finish()
    }
}
