//! Remote managed vector index.
//!
//! Delegates storage and search to a Pinecone-style data plane:
//! `upsert(id, vector, metadata)` and `query(vector, top_k)`. Vector ids are
//! derived from the chunk index (`chunk_{i}`), so re-upserting the same
//! document is idempotent per id. The index dimension and similarity metric
//! are declared in configuration; the dimension is validated against the
//! remote index when the backend opens, so a mismatch fails fast instead of
//! corrupting search quality. Cosine similarity is computed service-side,
//! matching the metric declared at index-creation time.

use crate::index::{IndexBackend, VectorIndex};
use crate::types::{Chunk, ChunkMetadata, RetrievalResult};
use docquery_core::config::RemoteIndexConfig;
use docquery_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout for index operations.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Backend for the remote managed index.
pub struct RemoteBackend {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl RemoteBackend {
    /// Create a remote backend, resolving the API key from the configured
    /// environment variable.
    pub fn new(config: RemoteIndexConfig) -> AppResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            AppError::Config(format!(
                "Remote index API key not found in env var '{}'",
                config.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl IndexBackend for RemoteBackend {
    async fn open(&self, dimensions: usize) -> AppResult<Box<dyn VectorIndex>> {
        let index = RemoteIndex {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            client: self.client.clone(),
            dimensions,
            count: 0,
        };
        index.verify_dimension().await?;
        Ok(Box::new(index))
    }
}

/// Client for one remote index.
pub struct RemoteIndex {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    dimensions: usize,
    count: usize,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

#[derive(Debug, Serialize)]
struct VectorRecord {
    id: String,
    values: Vec<f32>,
    metadata: StoredMetadata,
}

/// Metadata stored alongside each vector. The chunk text rides along so
/// search results are self-contained.
#[derive(Debug, Serialize, Deserialize)]
struct StoredMetadata {
    text: String,
    source: String,
    chunk_index: usize,
    word_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    score: f32,
    #[serde(default)]
    metadata: Option<StoredMetadata>,
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    dimension: Option<usize>,
}

impl RemoteIndex {
    /// Compare the locally declared dimension with the remote index.
    async fn verify_dimension(&self) -> AppResult<()> {
        let url = format!("{}/describe_index_stats", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to reach remote index: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Index(format!(
                "Remote index stats returned HTTP {}",
                status
            )));
        }

        let stats: IndexStats = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Invalid index stats response: {}", e)))?;

        if let Some(dimension) = stats.dimension {
            if dimension != self.dimensions {
                return Err(AppError::Index(format!(
                    "Remote index dimension is {}, expected {}",
                    dimension, self.dimensions
                )));
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorIndex for RemoteIndex {
    async fn add(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> AppResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "Chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let vectors: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, values)| VectorRecord {
                id: format!("chunk_{}", chunk.metadata.chunk_index),
                values,
                metadata: StoredMetadata {
                    text: chunk.text,
                    source: chunk.metadata.source,
                    chunk_index: chunk.metadata.chunk_index,
                    word_count: chunk.metadata.word_count,
                },
            })
            .collect();
        let upserted = vectors.len();

        let url = format!("{}/vectors/upsert", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors })
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Upsert request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Upsert returned HTTP {}: {}",
                status, message
            )));
        }

        self.count += upserted;
        tracing::debug!(upserted, total = self.count, "Upserted vectors to remote index");
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

        let url = format!("{}/query", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&QueryRequest {
                vector: query.to_vec(),
                top_k,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Query request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Query returned HTTP {}: {}",
                status, message
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Invalid query response: {}", e)))?;

        Ok(body
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(RetrievalResult {
                    text: metadata.text,
                    score: m.score,
                    metadata: ChunkMetadata {
                        source: metadata.source,
                        chunk_index: metadata.chunk_index,
                        word_count: metadata.word_count,
                    },
                })
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.count
    }
}
