//! Typed errors for chat-completion calls.
//!
//! The answer synthesizer maps each category to a distinct placeholder
//! answer, so failures must stay distinguishable until that boundary.
//! Converting into the unified `AppError` collapses the category into a
//! string and is only done for callers that treat LLM failures as fatal.

use docquery_core::AppError;
use thiserror::Error;

/// Failure categories for a single chat-completion call.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The per-call response timeout elapsed
    #[error("chat completion timed out")]
    Timeout,

    /// The endpoint returned HTTP 429
    #[error("chat completion rate limited")]
    RateLimited,

    /// The endpoint returned a non-success status
    #[error("chat API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The connection failed before a response arrived
    #[error("chat transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded as a chat completion
    #[error("malformed chat response: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Llm(err.to_string())
    }
}
