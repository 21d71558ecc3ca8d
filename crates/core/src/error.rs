//! Error types for the docquery pipeline.
//!
//! This module defines a unified error enum covering all fatal error
//! categories in the pipeline. Ingestion-stage errors (document fetch,
//! document parse, embedding, index) abort the whole request; per-question
//! synthesis failures are *not* errors — they are absorbed into placeholder
//! answers at the synthesizer boundary and never reach this type.

use thiserror::Error;

/// Unified error type for the docquery pipeline.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network/HTTP failure retrieving a document URL
    #[error("Document fetch error: {0}")]
    DocumentFetch(String),

    /// Neither PDF nor DOCX extraction succeeded
    #[error("Document parse error: {0}")]
    DocumentParse(String),

    /// Embedding backend failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index add/search failure
    #[error("Index error: {0}")]
    Index(String),

    /// Language model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
