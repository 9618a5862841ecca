//! Read-path orchestration: "similar movies for id X".
//!
//! Stateless glue between the vector index and the relational store. Holds no
//! persistent state of its own and swallows no index or store error — the
//! calling page degrades (hides its similar-movies section) on failure. A
//! movie with no stored vector is not an error: the answer is simply an empty
//! list (movies added before the pipeline ran, or lacking text, legitimately
//! have no vector).

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use serde::Serialize;

use super::{index, SimilarityError};
use crate::store;

/// Display card for one recommended movie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMovie {
    pub media_id: i64,
    pub media_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_cover: Option<String>,
}

/// Query knobs for a similarity lookup.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of recommendations.
    pub limit: usize,
    /// Optional cosine-similarity floor; `None` returns the plain top-K.
    pub min_similarity: Option<f64>,
    /// Candidate over-fetch multiplier for thresholded search.
    pub overfetch_factor: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            min_similarity: None,
            overfetch_factor: 3,
        }
    }
}

/// Movies most similar to `movie_id`, hydrated for display and ordered by
/// descending similarity.
///
/// `exclude_ids` removes movies the caller already shows (e.g. everything on
/// the user's list); the query movie itself is always excluded. Neighbor ids
/// are hydrated in one batched store query and re-sorted to the index's
/// ranked order, since the relational lookup does not preserve it. Neighbors
/// whose relational row has vanished are dropped silently.
pub fn similar_movies(
    conn: &Connection,
    movie_id: i64,
    exclude_ids: &[i64],
    options: &QueryOptions,
) -> Result<Vec<SimpleMovie>, SimilarityError> {
    let Some(vector) = index::get(conn, movie_id)? else {
        return Ok(Vec::new());
    };

    let mut exclude: HashSet<i64> = exclude_ids.iter().copied().collect();
    exclude.insert(movie_id);

    let hits = match options.min_similarity {
        Some(min) => index::search_with_threshold(
            conn,
            &vector,
            min,
            options.limit,
            &exclude,
            options.overfetch_factor,
        )?,
        None => index::search(conn, &vector, options.limit, &exclude)?,
    };

    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let neighbor_ids: Vec<i64> = hits.iter().map(|hit| hit.movie_id).collect();
    let cards = store::fetch_movies_by_ids(conn, &neighbor_ids)
        .map_err(SimilarityError::StoreIo)?;

    let mut by_id: HashMap<i64, store::MovieCard> =
        cards.into_iter().map(|card| (card.id, card)).collect();

    let results = neighbor_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|card| SimpleMovie {
            media_id: card.id,
            media_name: card.name,
            media_cover: card.image_cover,
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::embedding::EMBEDDING_DIM;
    use crate::similarity::index;
    use crate::store;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn unit3(x: f32, y: f32, z: f32) -> Vec<f32> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        v[0] = x;
        v[1] = y;
        v[2] = z;
        let norm: f32 = (x * x + y * y + z * z).sqrt();
        if norm > 0.0 {
            for c in &mut v {
                *c /= norm;
            }
        }
        v
    }

    fn seed(conn: &Connection, id: i64, name: &str, vector: &[f32]) {
        let cover = format!("{name}.jpg");
        store::upsert_movie(conn, id, name, None, None, Some(cover.as_str())).unwrap();
        index::upsert(conn, id, vector).unwrap();
    }

    #[test]
    fn unembedded_movie_yields_empty_not_error() {
        let conn = test_db();
        store::upsert_movie(&conn, 1, "Unembedded", None, None, None).unwrap();
        let results = similar_movies(&conn, 1, &[], &QueryOptions::default()).unwrap();
        assert!(results.is_empty());

        // Entirely unknown id behaves the same
        let results = similar_movies(&conn, 999, &[], &QueryOptions::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn neighbors_ranked_by_similarity() {
        let conn = test_db();
        seed(&conn, 1, "A", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 2, "B", &unit3(0.9, 0.1, 0.0));
        seed(&conn, 3, "C", &unit3(0.0, 1.0, 0.0));

        let options = QueryOptions {
            limit: 2,
            ..QueryOptions::default()
        };
        let results = similar_movies(&conn, 1, &[], &options).unwrap();

        let ids: Vec<i64> = results.iter().map(|m| m.media_id).collect();
        assert_eq!(ids, vec![2, 3], "B is closer to A than C is");
        assert_eq!(results[0].media_name, "B");
        assert_eq!(results[0].media_cover.as_deref(), Some("B.jpg"));
    }

    #[test]
    fn never_returns_the_query_movie() {
        let conn = test_db();
        seed(&conn, 1, "A", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 2, "B", &unit3(0.9, 0.1, 0.0));

        let results = similar_movies(&conn, 1, &[], &QueryOptions::default()).unwrap();
        assert!(results.iter().all(|m| m.media_id != 1));
    }

    #[test]
    fn caller_exclusions_are_honored() {
        let conn = test_db();
        seed(&conn, 1, "A", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 2, "B", &unit3(0.9, 0.1, 0.0));
        seed(&conn, 3, "C", &unit3(0.0, 1.0, 0.0));

        let options = QueryOptions {
            limit: 2,
            ..QueryOptions::default()
        };
        let results = similar_movies(&conn, 1, &[2], &options).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.media_id).collect();
        assert_eq!(ids, vec![3], "excluding B leaves only C");
    }

    #[test]
    fn threshold_floor_drops_weak_neighbors() {
        let conn = test_db();
        seed(&conn, 1, "A", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 2, "B", &unit3(0.9, 0.1, 0.0));
        seed(&conn, 3, "C", &unit3(0.0, 1.0, 0.0)); // orthogonal to A

        let options = QueryOptions {
            limit: 10,
            min_similarity: Some(0.5),
            overfetch_factor: 3,
        };
        let results = similar_movies(&conn, 1, &[], &options).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.media_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn missing_relational_rows_are_dropped() {
        let conn = test_db();
        seed(&conn, 1, "A", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 2, "B", &unit3(0.9, 0.1, 0.0));
        // Vector without a movies row — an orphan from a deletion that never
        // called index::delete.
        index::upsert(&conn, 3, &unit3(0.8, 0.2, 0.0)).unwrap();

        let results = similar_movies(&conn, 1, &[], &QueryOptions::default()).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.media_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn hydrated_order_matches_ranked_order() {
        let conn = test_db();
        // Insert relational rows in an order unrelated to similarity so a
        // naive pass-through of the store order would be wrong.
        seed(&conn, 9, "Far", &unit3(0.2, 1.0, 0.0));
        seed(&conn, 1, "Query", &unit3(1.0, 0.0, 0.0));
        seed(&conn, 5, "Near", &unit3(0.95, 0.05, 0.0));
        seed(&conn, 3, "Mid", &unit3(0.7, 0.7, 0.0));

        let results = similar_movies(&conn, 1, &[], &QueryOptions::default()).unwrap();
        let names: Vec<&str> = results.iter().map(|m| m.media_name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Mid", "Far"]);
    }
}
