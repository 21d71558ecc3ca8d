//! Grounded answer synthesis.
//!
//! Given a question and its ranked retrieved chunks, assemble a grounding
//! context and ask the model to answer strictly from it. This boundary never
//! fails: every model failure degrades into a distinct, human-readable
//! placeholder answer, so the caller always receives exactly one string per
//! question. Timeout and rate-limit failures are retried with exponential
//! backoff within the configured budget before the placeholder is produced.

use crate::types::RetrievalResult;
use docquery_core::config::SynthesisConfig;
use docquery_llm::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, LlmError};
use std::sync::Arc;
use std::time::Duration;

/// Sentinel answer when no context chunks were retrieved. The model is not
/// called in that case.
pub const NO_CONTEXT_ANSWER: &str =
    "No relevant information found in the document to answer this question.";

/// Placeholder for a response whose content is empty or whitespace-only.
pub const EMPTY_CONTENT_ANSWER: &str =
    "The model returned an empty response. This might be due to content filtering or processing issues.";

/// Placeholder for a response with no choices.
pub const NO_CHOICES_ANSWER: &str = "The model did not return a valid response structure.";

/// Placeholder for a choice carrying no message.
pub const NO_MESSAGE_ANSWER: &str = "The model response did not include a message.";

/// Placeholder for a response body that could not be decoded at all.
pub const MALFORMED_RESPONSE_ANSWER: &str =
    "Received an invalid response from the language model.";

/// Placeholder for a per-call timeout.
pub const TIMEOUT_ANSWER: &str =
    "The request timed out while processing this question. Please try again.";

/// Placeholder for a rate-limited call.
pub const RATE_LIMIT_ANSWER: &str = "Rate limit exceeded. Please try again in a moment.";

/// Maximum length of error detail embedded in a placeholder answer.
const MAX_ERROR_DETAIL: usize = 100;

/// Initial backoff duration for retried calls, in milliseconds.
const INITIAL_BACKOFF_MS: u64 = 100;

/// Synthesizes grounded answers from retrieved context.
pub struct AnswerSynthesizer {
    client: Arc<dyn ChatClient>,
    config: SynthesisConfig,
}

impl AnswerSynthesizer {
    /// Create a synthesizer around a chat client.
    pub fn new(client: Arc<dyn ChatClient>, config: SynthesisConfig) -> Self {
        Self { client, config }
    }

    /// Produce one answer for one question.
    ///
    /// `context` must already be rank-ordered (best first); only the top
    /// `max_context_chunks` entries are used. Never fails: every failure
    /// category maps to its own placeholder string.
    pub async fn synthesize(&self, question: &str, context: &[RetrievalResult]) -> String {
        if context.is_empty() {
            tracing::debug!(question, "No context retrieved, returning sentinel");
            return NO_CONTEXT_ANSWER.to_string();
        }

        let request = self.build_request(question, context);

        match self.complete_with_retries(&request).await {
            Ok(completion) => self.extract_answer(question, &completion),
            Err(e) => self.placeholder_for(question, &e),
        }
    }

    /// Call the model, retrying timeouts and rate limits with exponential
    /// backoff within the configured budget.
    async fn complete_with_retries(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let mut attempt = 0;

        loop {
            match self.client.complete(request).await {
                Ok(completion) => return Ok(completion),
                Err(e @ (LlmError::Timeout | LlmError::RateLimited))
                    if attempt < self.config.max_retries =>
                {
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_retries = self.config.max_retries,
                        backoff_ms,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn build_request(&self, question: &str, context: &[RetrievalResult]) -> ChatRequest {
        let context_text: Vec<String> = context
            .iter()
            .take(self.config.max_context_chunks)
            .enumerate()
            .map(|(i, chunk)| format!("[Document Section {}]:\n{}", i + 1, chunk.text))
            .collect();

        let prompt = format!(
            "You are an expert document analyst. Based on the provided document sections, \
             answer the user's question accurately and concisely.\n\n\
             DOCUMENT CONTEXT:\n{}\n\n\
             QUESTION: {}\n\n\
             INSTRUCTIONS:\n\
             - Provide a direct, accurate answer based solely on the document context above\n\
             - Quote specific source language when relevant (use quotes \"like this\")\n\
             - If the information isn't clearly stated in the context, say so honestly\n\
             - Be concise but complete in your response\n\
             - Focus on key details like amounts, timeframes, conditions, and limitations\n\
             - If there are multiple conditions or requirements, list them clearly\n\n\
             ANSWER:",
            context_text.join("\n\n"),
            question
        );

        ChatRequest::new(
            self.config.model.clone(),
            vec![
                ChatMessage::system(
                    "You are a precise document expert who provides accurate, evidence-based \
                     answers. Always base your responses on the provided document context.",
                ),
                ChatMessage::user(prompt),
            ],
        )
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(self.config.temperature)
        .with_timeout(Duration::from_secs(self.config.timeout_secs))
    }

    /// Validate the response shape and extract the answer text. Each
    /// degenerate shape degrades to its own placeholder.
    fn extract_answer(&self, question: &str, completion: &ChatCompletion) -> String {
        let Some(choice) = completion.choices.first() else {
            tracing::warn!(question, "No choices in model response");
            return NO_CHOICES_ANSWER.to_string();
        };

        let Some(message) = &choice.message else {
            tracing::warn!(question, "No message in model choice");
            return NO_MESSAGE_ANSWER.to_string();
        };

        match message.content.as_deref().map(str::trim) {
            Some(content) if !content.is_empty() => {
                tracing::debug!(question, "Generated answer");
                content.to_string()
            }
            _ => {
                tracing::warn!(question, "Empty content in model response");
                EMPTY_CONTENT_ANSWER.to_string()
            }
        }
    }

    /// Map each failure category to its distinguishable placeholder.
    fn placeholder_for(&self, question: &str, error: &LlmError) -> String {
        tracing::warn!(question, error = %error, "Model call failed, degrading to placeholder");

        match error {
            LlmError::Timeout => TIMEOUT_ANSWER.to_string(),
            LlmError::RateLimited => RATE_LIMIT_ANSWER.to_string(),
            LlmError::MalformedResponse(_) => MALFORMED_RESPONSE_ANSWER.to_string(),
            LlmError::Api { message, .. } => format!(
                "API error occurred while processing this question: {}",
                truncate_detail(message)
            ),
            LlmError::Transport(message) => {
                format!("An unexpected error occurred: {}", truncate_detail(message))
            }
        }
    }
}

fn truncate_detail(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_DETAIL {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(MAX_ERROR_DETAIL).collect();
        format!("{}...", truncated)
    }
}
