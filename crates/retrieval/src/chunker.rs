//! Text chunking into overlapping word-windows.
//!
//! The window slides over the whitespace-split word sequence, advancing by
//! `chunk_size - overlap` words per step, and terminates after the window
//! that reaches the end of the sequence (no residual empty chunk). The same
//! input always yields the same boundaries.

use crate::types::{Chunk, ChunkMetadata};

/// Chunk text into overlapping word-windows.
///
/// `chunk_index` is the 0-based emission order. Empty input yields zero
/// chunks — callers must treat that as "no retrievable content", not an
/// error. A text shorter than one window yields exactly one chunk.
pub fn chunk_text(text: &str, source: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_size == 0 {
        return vec![];
    }

    // Config validation enforces overlap < chunk_size; guard anyway so a bad
    // caller cannot stall the loop.
    let step = if chunk_size > overlap {
        chunk_size - overlap
    } else {
        chunk_size
    };

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(words.len());
        let window = &words[start..end];

        chunks.push(Chunk {
            text: window.join(" "),
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk_index: chunks.len(),
                word_count: window.len(),
            },
        });

        if start + chunk_size >= words.len() {
            break;
        }
        start += step;
    }

    tracing::debug!(
        chunks = chunks.len(),
        chunk_size,
        overlap,
        "Chunked document text"
    );

    chunks
}
