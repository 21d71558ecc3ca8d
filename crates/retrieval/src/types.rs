//! Retrieval pipeline type definitions.

use serde::{Deserialize, Serialize};

/// Positional metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document URL
    pub source: String,

    /// 0-based emission order within the document
    pub chunk_index: usize,

    /// Number of words in the chunk (always > 0)
    pub word_count: usize,
}

/// A bounded, overlapping window of a document's text — the unit of
/// retrieval. Chunks live for one request: created by the chunker, consumed
/// by the embedder and vector index, discarded with the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Window text (whitespace-joined words)
    pub text: String,

    /// Positional metadata
    pub metadata: ChunkMetadata,
}

/// One nearest-neighbor hit, produced per query.
///
/// Results are ordered by descending score (higher = more similar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Chunk text
    pub text: String,

    /// Similarity score
    pub score: f32,

    /// Metadata of the matched chunk
    pub metadata: ChunkMetadata,
}
