//! Embedding generation.
//!
//! Maps texts (chunks and questions) to fixed-dimension vectors through a
//! provider-agnostic trait. Calls are batched and order-preserving; a
//! provider failure aborts the whole batch (no partial results).

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::hashed::HashedProvider;
pub use providers::ollama::OllamaProvider;
