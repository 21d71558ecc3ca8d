//! Deterministic feature-hashing embedding provider.
//!
//! Buckets word features into a fixed-dimension vector via FNV-1a hashing
//! and L2-normalizes the result. Not semantically meaningful, but a pure
//! function of the text: the same input always yields the same vector,
//! which makes it the provider of choice for tests and offline runs.

use crate::embeddings::EmbeddingProvider;
use crate::index::l2_normalize;
use async_trait::async_trait;
use docquery_core::AppResult;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Feature-hashing embedding provider.
#[derive(Debug, Clone)]
pub struct HashedProvider {
    dimensions: usize,
}

impl HashedProvider {
    /// Create a provider producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text.split_whitespace() {
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            // Use a high bit for the sign so bucket and sign are independent
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

/// FNV-1a 64-bit hash. Stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashedProvider {
    fn provider_name(&self) -> &str {
        "hashed"
    }

    fn model_name(&self) -> &str {
        "feature-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
