//! Persistent cosine-similarity vector index.
//!
//! One row per movie in the `movie_vectors` vec0 table (sqlite-vec,
//! `distance_metric=cosine`). KNN queries return cosine distance; every
//! public search maps it to `similarity = 1 - distance` so callers only see
//! similarities in `[-1, 1]`.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::{bytes_to_embedding, embedding_to_bytes, SimilarityError};
use crate::embedding::EMBEDDING_DIM;

/// One ranked neighbor from a KNN search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub movie_id: i64,
    pub similarity: f64,
}

type Result<T> = std::result::Result<T, SimilarityError>;

fn check_dimension(vector: &[f32]) -> Result<()> {
    if vector.len() != EMBEDDING_DIM {
        return Err(SimilarityError::WrongDimension {
            expected: EMBEDDING_DIM,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Insert or replace the vector for a movie.
///
/// vec0 tables have no native upsert, so this is delete + insert. Replaying
/// the same call is safe; a different vector replaces the old one entirely.
pub fn upsert(conn: &Connection, movie_id: i64, embedding: &[f32]) -> Result<()> {
    check_dimension(embedding)?;
    conn.execute(
        "DELETE FROM movie_vectors WHERE movie_id = ?1",
        params![movie_id],
    )
    .map_err(SimilarityError::IndexIo)?;
    conn.execute(
        "INSERT INTO movie_vectors (movie_id, embedding) VALUES (?1, ?2)",
        params![movie_id, embedding_to_bytes(embedding)],
    )
    .map_err(SimilarityError::IndexIo)?;
    Ok(())
}

/// Point lookup. `None` if the movie was never embedded.
pub fn get(conn: &Connection, movie_id: i64) -> Result<Option<Vec<f32>>> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT embedding FROM movie_vectors WHERE movie_id = ?1",
            params![movie_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(SimilarityError::IndexIo)?;
    Ok(blob.map(|b| bytes_to_embedding(&b)))
}

/// Remove a movie's vector. Cleanup hook for movie deletion; missing rows
/// are a no-op.
pub fn delete(conn: &Connection, movie_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM movie_vectors WHERE movie_id = ?1",
        params![movie_id],
    )
    .map_err(SimilarityError::IndexIo)?;
    Ok(())
}

/// Number of stored vectors.
pub fn count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM movie_vectors", [], |row| row.get(0))
        .map_err(SimilarityError::IndexIo)
}

/// Cosine top-K search with an exclusion set.
///
/// Over-fetches `k + exclude.len()` candidates so exclusions cannot starve
/// the result, then filters and re-sorts by (similarity DESC, movie_id ASC).
/// The secondary id sort makes equal-score ordering deterministic — the KNN
/// scan itself only orders by distance.
pub fn search(
    conn: &Connection,
    query: &[f32],
    k: usize,
    exclude: &HashSet<i64>,
) -> Result<Vec<SearchHit>> {
    check_dimension(query)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let fetch = k + exclude.len();
    let mut stmt = conn
        .prepare(
            "SELECT movie_id, distance FROM movie_vectors \
             WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
        )
        .map_err(SimilarityError::IndexIo)?;

    let candidates = stmt
        .query_map(params![embedding_to_bytes(query), fetch as i64], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(SimilarityError::IndexIo)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(SimilarityError::IndexIo)?;

    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .filter(|(id, _)| !exclude.contains(id))
        .map(|(movie_id, distance)| SearchHit {
            movie_id,
            similarity: 1.0 - distance,
        })
        .collect();

    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
    hits.truncate(k);
    Ok(hits)
}

/// Ranked search with a similarity floor.
///
/// vec0 KNN cannot push a similarity predicate into the scan, so this
/// over-fetches `limit * overfetch_factor` ranked candidates, filters to
/// `similarity >= min_similarity`, and truncates to `limit`. The factor is a
/// recall-vs-latency tunable (`search.overfetch_factor` in config); anything
/// below 2 is clamped to 2.
pub fn search_with_threshold(
    conn: &Connection,
    query: &[f32],
    min_similarity: f64,
    limit: usize,
    exclude: &HashSet<i64>,
    overfetch_factor: usize,
) -> Result<Vec<SearchHit>> {
    let factor = overfetch_factor.max(2);
    let mut hits = search(conn, query, limit.saturating_mul(factor), exclude)?;
    hits.retain(|hit| hit.similarity >= min_similarity);
    hits.truncate(limit);
    Ok(hits)
}
