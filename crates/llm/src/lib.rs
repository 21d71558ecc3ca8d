//! Docquery LLM Library
//!
//! This crate provides the chat-completion abstraction used by the answer
//! synthesizer:
//! - `ChatClient` trait with OpenAI-chat-style request/response types
//! - `LlmError` taxonomy distinguishing timeout, rate-limit, API, transport,
//!   and malformed-response failures
//! - OpenAI-compatible provider (works against OpenRouter and compatible
//!   endpoints)
//! - Factory for creating clients by provider name

pub mod client;
pub mod error;
pub mod factory;
pub mod providers;

pub use client::{
    AssistantMessage, ChatChoice, ChatClient, ChatCompletion, ChatMessage, ChatRequest,
};
pub use error::LlmError;
pub use factory::create_client;
pub use providers::OpenAiClient;
