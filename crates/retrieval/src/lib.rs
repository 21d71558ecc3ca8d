//! Docquery Retrieval Library
//!
//! The retrieval pipeline for answering natural-language questions about a
//! remote document:
//! - `loader` — fetch a PDF/DOCX by URL and extract page-aware plain text
//! - `chunker` — split text into overlapping word-windows
//! - `embeddings` — map texts to fixed-dimension vectors (batched)
//! - `index` — store chunk vectors and answer nearest-neighbor queries
//!   (in-memory flat index or remote managed index)
//! - `synthesize` — turn a question plus retrieved context into a grounded
//!   answer, degrading every model failure into a placeholder string
//! - `pipeline` — orchestrate one request end to end
//!
//! Data flows one way: URL → text → chunks → vectors → index;
//! question → vector → nearest chunks → answer.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod synthesize;
pub mod types;

pub use chunker::chunk_text;
pub use embeddings::{create_provider, EmbeddingProvider, HashedProvider};
pub use index::{
    create_backend, IndexBackend, MemoryBackend, MemoryIndex, RemoteBackend, VectorIndex,
};
pub use loader::DocumentLoader;
pub use pipeline::QueryPipeline;
pub use synthesize::{AnswerSynthesizer, NO_CONTEXT_ANSWER};
pub use types::{Chunk, ChunkMetadata, RetrievalResult};
