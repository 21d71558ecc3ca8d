//! Configuration management for the docquery pipeline.
//!
//! Configuration is supplied as named options grouped by concern
//! (chunking, embedding, vector index, answer synthesis). Values come from
//! an optional YAML file with serde defaults filling the gaps; secrets are
//! resolved from environment variables at use time and never stored in the
//! file itself.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Document chunking options
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding provider options
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index backend options
    #[serde(default)]
    pub index: IndexConfig,

    /// Answer synthesis / language model options
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Log level override (e.g., "debug", "info")
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Chunking options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in words
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive windows in words (must be < chunk_size)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// Embedding provider options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider identifier ("ollama", "hashed")
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Embedding model identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub dimensions: usize,

    /// Number of texts embedded per batch call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider endpoint override (e.g., Ollama base URL)
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Vector index backend options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend identifier ("memory" or "remote")
    #[serde(default = "default_index_backend")]
    pub backend: String,

    /// Remote backend settings (required when backend = "remote")
    #[serde(default)]
    pub remote: Option<RemoteIndexConfig>,
}

/// Remote managed vector index settings (Pinecone-style data plane).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIndexConfig {
    /// Index data-plane endpoint URL
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_remote_api_key_env")]
    pub api_key_env: String,

    /// Similarity metric declared for the index
    #[serde(default = "default_metric")]
    pub metric: String,
}

/// Answer synthesis options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Chat model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Chat completion endpoint base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    /// Maximum retrieved chunks assembled into the grounding context
    #[serde(default = "default_max_context_chunks")]
    pub max_context_chunks: usize,

    /// Maximum tokens the model may generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (kept low for determinism)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call model response timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bounded retry budget for timeout/rate-limit failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_chunk_size() -> usize {
    600
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_embedding_dim() -> usize {
    384
}

fn default_batch_size() -> usize {
    100
}

fn default_index_backend() -> String {
    "memory".to_string()
}

fn default_remote_api_key_env() -> String {
    "VECTOR_INDEX_API_KEY".to_string()
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_llm_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_llm_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_max_context_chunks() -> usize {
    5
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_embedding_dim(),
            batch_size: default_batch_size(),
            endpoint: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_index_backend(),
            remote: None,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            api_key_env: default_llm_api_key_env(),
            max_context_chunks: default_max_context_chunks(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunking.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be > 0".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be > 0".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "embedding batch_size must be > 0".to_string(),
            ));
        }
        if self.synthesis.max_context_chunks == 0 {
            return Err(AppError::Config(
                "max_context_chunks must be > 0".to_string(),
            ));
        }
        match self.index.backend.as_str() {
            "memory" => {}
            "remote" => {
                if self.index.remote.is_none() {
                    return Err(AppError::Config(
                        "index backend 'remote' requires the [index.remote] section".to_string(),
                    ));
                }
            }
            other => {
                return Err(AppError::Config(format!(
                    "Unknown index backend: '{}'. Supported backends: memory, remote",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Resolve the chat-completion API key from the configured env var.
    pub fn llm_api_key(&self) -> Option<String> {
        std::env::var(&self.synthesis.api_key_env).ok()
    }
}
