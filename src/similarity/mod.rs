//! Core similarity engine: text composition, vector index, query service,
//! and bulk rebuild.
//!
//! The engine links two independently-owned stores through the bare integer
//! movie id: the relational `movies` table (display metadata, owned by
//! [`crate::store`]) and the `movie_vectors` index (embeddings, owned by
//! [`index`]). The id acts as a foreign key between them without any
//! transactional link.

pub mod compose;
pub mod index;
pub mod rebuild;
pub mod service;

use std::time::Duration;
use thiserror::Error;

/// Failure kinds surfaced by the similarity engine.
///
/// Absence of a vector for a queried movie is deliberately NOT represented
/// here — it is a normal empty-result case, not an error.
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// Model failed to load or inference failed. Retryable: the shared
    /// embedder does not cache a failed load.
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(anyhow::Error),

    /// The embedding call exceeded its configured deadline.
    #[error("embedding call timed out after {0:?}")]
    EmbeddingTimeout(Duration),

    /// A vector of the wrong width was offered to the index.
    #[error("expected a {expected}-dimension vector, got {actual}")]
    WrongDimension { expected: usize, actual: usize },

    /// Underlying vector storage failed.
    #[error("vector index error: {0}")]
    IndexIo(#[source] rusqlite::Error),

    /// Relational movie store failed during hydration or a write-back.
    #[error("movie store error: {0}")]
    StoreIo(#[source] rusqlite::Error),
}

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Decode a sqlite-vec embedding blob back into f32s.
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
