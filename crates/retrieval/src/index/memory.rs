//! In-memory flat vector index.
//!
//! Exact inner-product search over L2-normalized vectors, O(n·d) per query.
//! Appropriate at the scale of one document's chunks (hundreds to
//! low-thousands). State lives only for the request that populated it.

use crate::index::{l2_normalize, IndexBackend, VectorIndex};
use crate::types::{Chunk, RetrievalResult};
use docquery_core::{AppError, AppResult};

/// Backend producing fresh in-memory indexes.
pub struct MemoryBackend;

#[async_trait::async_trait]
impl IndexBackend for MemoryBackend {
    async fn open(&self, dimensions: usize) -> AppResult<Box<dyn VectorIndex>> {
        Ok(Box::new(MemoryIndex::new(dimensions)))
    }
}

/// Flat in-memory index: vectors and chunks stored side by side in
/// insertion order. The index exclusively owns each chunk/vector pair for
/// its lifetime.
pub struct MemoryIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
    chunks: Vec<Chunk>,
}

impl MemoryIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
            chunks: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    async fn add(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> AppResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "Chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        for (chunk, mut embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.len() != self.dimensions {
                return Err(AppError::Index(format!(
                    "Embedding dimension mismatch: got {}, expected {}",
                    embedding.len(),
                    self.dimensions
                )));
            }
            l2_normalize(&mut embedding);
            self.vectors.push(embedding);
            self.chunks.push(chunk);
        }

        tracing::debug!(total = self.chunks.len(), "Populated in-memory index");
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RetrievalResult>> {
        if query.len() != self.dimensions {
            return Err(AppError::Index(format!(
                "Query dimension mismatch: got {}, expected {}",
                query.len(),
                self.dimensions
            )));
        }
        if self.chunks.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }

        let mut normalized = query.to_vec();
        l2_normalize(&mut normalized);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let score = v.iter().zip(&normalized).map(|(a, b)| a * b).sum::<f32>();
                (i, score)
            })
            .collect();

        // Stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| RetrievalResult {
                text: self.chunks[i].text.clone(),
                score,
                metadata: self.chunks[i].metadata.clone(),
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source: "https://example.com/doc.pdf".to_string(),
                chunk_index: index,
                word_count: text.split_whitespace().count(),
            },
        }
    }

    #[tokio::test]
    async fn test_self_similarity_is_one() {
        let mut index = MemoryIndex::new(3);
        // Deliberately unnormalized on both sides
        index
            .add(vec![chunk(0, "only entry")], vec![vec![2.0, 4.0, 4.0]])
            .await
            .unwrap();

        let results = index.search(&[2.0, 4.0, 4.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_normalization_matches_for_scaled_query() {
        let mut index = MemoryIndex::new(3);
        index
            .add(vec![chunk(0, "entry")], vec![vec![1.0, 2.0, 3.0]])
            .await
            .unwrap();

        // The same direction at a different magnitude must score identically
        let results = index.search(&[10.0, 20.0, 30.0], 1).await.unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_results_ordered_by_descending_score() {
        let mut index = MemoryIndex::new(2);
        index
            .add(
                vec![chunk(0, "east"), chunk(1, "north"), chunk(2, "northeast")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            )
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].text, "east");
        assert_eq!(results[1].text, "northeast");
        assert_eq!(results[2].text, "north");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let mut index = MemoryIndex::new(2);
        index
            .add(
                vec![chunk(0, "first"), chunk(1, "second")],
                vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            )
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
    }

    #[tokio::test]
    async fn test_top_k_cannot_exceed_corpus_size() {
        let mut index = MemoryIndex::new(2);
        index
            .add(
                vec![chunk(0, "a"), chunk(1, "b"), chunk(2, "c")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            )
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_results() {
        let index = MemoryIndex::new(4);
        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_on_add() {
        let mut index = MemoryIndex::new(3);
        let err = index
            .add(vec![chunk(0, "bad")], vec![vec![1.0, 2.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Index(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_on_search() {
        let index = MemoryIndex::new(3);
        let err = index.search(&[1.0], 1).await.unwrap_err();
        assert!(matches!(err, AppError::Index(_)));
    }

    #[tokio::test]
    async fn test_metadata_round_trips() {
        let mut index = MemoryIndex::new(2);
        index
            .add(vec![chunk(7, "payload text")], vec![vec![0.5, 0.5]])
            .await
            .unwrap();

        let results = index.search(&[0.5, 0.5], 1).await.unwrap();
        assert_eq!(results[0].metadata.chunk_index, 7);
        assert_eq!(results[0].metadata.word_count, 2);
        assert_eq!(results[0].metadata.source, "https://example.com/doc.pdf");
    }
}
