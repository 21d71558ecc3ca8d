//! Vector index abstraction and backends.
//!
//! An index stores one document's chunk vectors and answers nearest-neighbor
//! queries by cosine similarity (inner product over unit-normalized
//! vectors). Two interchangeable backends exist: an in-memory flat index and
//! a remote managed index. Each request opens a fresh index through an
//! `IndexBackend`, so no state is ever shared between concurrent requests.

pub mod memory;
pub mod remote;

pub use memory::{MemoryBackend, MemoryIndex};
pub use remote::{RemoteBackend, RemoteIndex};

use crate::types::{Chunk, RetrievalResult};
use docquery_core::config::IndexConfig;
use docquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for vector index backends.
///
/// Both implementations satisfy the same pre/post-conditions:
/// `add` pairs each chunk 1:1 with its embedding; `search` returns at most
/// `top_k` results ordered by descending similarity, and zero results when
/// the index is empty. Stored and query vectors are normalized identically.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert chunks with their embeddings, in order.
    ///
    /// `chunks` and `embeddings` must have equal length and every embedding
    /// must match the index dimension.
    async fn add(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    async fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RetrievalResult>>;

    /// Number of indexed chunks.
    fn len(&self) -> usize;

    /// Whether the index holds no chunks.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Factory opening a fresh, request-scoped index.
///
/// The backend is chosen once, by configuration, at construction time; the
/// orchestrator only ever sees this trait.
#[async_trait::async_trait]
pub trait IndexBackend: Send + Sync {
    /// Open a fresh index for one request's chunk set.
    async fn open(&self, dimensions: usize) -> AppResult<Box<dyn VectorIndex>>;
}

impl std::fmt::Debug for dyn IndexBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn IndexBackend")
    }
}

/// Create an index backend based on configuration.
pub fn create_backend(config: &IndexConfig) -> AppResult<Arc<dyn IndexBackend>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryBackend)),
        "remote" => {
            let remote = config.remote.clone().ok_or_else(|| {
                AppError::Config(
                    "index backend 'remote' requires the [index.remote] section".to_string(),
                )
            })?;
            Ok(Arc::new(RemoteBackend::new(remote)?))
        }
        other => Err(AppError::Config(format!(
            "Unknown index backend: '{}'. Supported backends: memory, remote",
            other
        ))),
    }
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left untouched.
///
/// Applied identically to stored and query vectors; a normalization mismatch
/// between the two sides is a correctness bug, not a quality regression.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
