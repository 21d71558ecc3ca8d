//! Embedding provider trait and factory.

use docquery_core::config::EmbeddingConfig;
use docquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// The contract is order-preserving and total: one vector per input text,
/// same order, fixed dimension. Failures are all-or-nothing per call.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "hashed")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(config);
            Ok(Arc::new(provider))
        }

        "hashed" => {
            let provider = super::providers::hashed::HashedProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Embedding(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, hashed",
            config.provider
        ))),
    }
}
