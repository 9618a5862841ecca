//! CLI `similar` command — nearest-neighbor lookup for one movie.

use anyhow::{Context, Result};

use crate::config::CinesimConfig;
use crate::similarity::service::{similar_movies, QueryOptions};

/// Print similar movies for `movie_id` as JSON on stdout.
pub fn similar(
    config: &CinesimConfig,
    movie_id: i64,
    exclude: &[i64],
    limit: Option<usize>,
    min_similarity: Option<f64>,
) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path).context("failed to open database")?;

    let options = QueryOptions {
        limit: limit.unwrap_or(config.search.default_limit),
        min_similarity: min_similarity.or_else(|| {
            (config.search.min_similarity > 0.0).then_some(config.search.min_similarity)
        }),
        overfetch_factor: config.search.overfetch_factor,
    };

    let results = similar_movies(&conn, movie_id, exclude, &options)?;

    if results.is_empty() {
        eprintln!("No similar movies for id {movie_id} (missing vector or no neighbors).");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
