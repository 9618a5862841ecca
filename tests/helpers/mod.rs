#![allow(dead_code)]

use std::sync::Arc;

use cinesim::db;
use cinesim::embedding::{EmbeddingProvider, SharedEmbedder, EMBEDDING_DIM};
use cinesim::similarity::index;
use cinesim::store;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Deterministic 384-dim embedding with a spike at position `seed`.
/// Each seed produces a distinct, orthogonal vector.
pub fn test_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed as usize % EMBEDDING_DIM] = 1.0;
    v
}

/// L2-normalized vector with weight on two dimensions — used to build
/// neighbors at controlled cosine similarity to a spike vector.
pub fn blended_embedding(dim_a: usize, weight_a: f32, dim_b: usize, weight_b: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[dim_a] = weight_a;
    v[dim_b] = weight_b;
    let norm: f32 = (weight_a * weight_a + weight_b * weight_b).sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Insert a movie record plus its vector.
pub fn seed_movie(conn: &Connection, id: i64, name: &str, embedding: &[f32]) {
    store::upsert_movie(conn, id, name, None, None, None).unwrap();
    index::upsert(conn, id, embedding).unwrap();
}

/// Deterministic stand-in for the ONNX model: spikes a dimension derived
/// from the text bytes, so distinct texts get distinct unit vectors.
pub struct StubProvider;

impl EmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        let dim = text.bytes().map(usize::from).sum::<usize>() % EMBEDDING_DIM;
        v[dim] = 1.0;
        Ok(v)
    }
}

/// A shared embedder backed by [`StubProvider`].
pub fn stub_embedder() -> SharedEmbedder {
    SharedEmbedder::preloaded(Arc::new(StubProvider))
}
