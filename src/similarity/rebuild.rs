//! Bulk vector rebuild — regenerate every movie's embedding.
//!
//! Strictly sequential: the local model is a single stateful instance, so
//! concurrent embedding calls would only contend on its lock. Each movie is
//! composed, embedded, upserted, and its composed text written back to the
//! movie record before the next one starts. Upsert semantics make the whole
//! run idempotent and restart-safe; there is no run-wide transaction.
//!
//! A failure on one movie does not abort the run: it is logged, counted, and
//! the loop continues. A multi-hour rebuild should not be lost to one bad
//! record.

use indicatif::ProgressBar;
use rusqlite::Connection;
use tracing::{info, warn};

use super::compose::compose_embedding_text;
use super::{index, SimilarityError};
use crate::embedding::SharedEmbedder;
use crate::store::{self, MovieSeed};

/// Emit a progress log line every this many processed movies.
const CHECKPOINT_INTERVAL: usize = 100;

/// Outcome of a full rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub total: usize,
    pub embedded: usize,
    pub failed: usize,
}

/// Rebuild vectors for every movie in the store.
///
/// `progress` drives an optional terminal bar (one tick per movie); log
/// checkpoints are emitted regardless.
pub async fn rebuild_all(
    conn: &Connection,
    embedder: &SharedEmbedder,
    progress: Option<&ProgressBar>,
) -> Result<RebuildSummary, SimilarityError> {
    let movies = store::fetch_movies_for_embedding(conn).map_err(SimilarityError::StoreIo)?;
    let total = movies.len();
    info!(total, "starting vector rebuild");

    let mut embedded = 0usize;
    let mut failed = 0usize;

    for (i, movie) in movies.iter().enumerate() {
        match embed_seed(conn, embedder, movie).await {
            Ok(()) => embedded += 1,
            Err(err) => {
                failed += 1;
                warn!(movie_id = movie.id, error = %err, "skipping movie after failure");
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }

        let processed = i + 1;
        if processed % CHECKPOINT_INTERVAL == 0 {
            info!(processed, total, "rebuild checkpoint");
        }
    }

    info!(total, embedded, failed, "vector rebuild complete");
    Ok(RebuildSummary {
        total,
        embedded,
        failed,
    })
}

/// Incremental per-movie job: embed one movie through the same
/// compose/embed/upsert/record path the bulk rebuild uses.
///
/// Returns `Ok(false)` if the movie does not exist.
pub async fn embed_movie(
    conn: &Connection,
    embedder: &SharedEmbedder,
    movie_id: i64,
) -> Result<bool, SimilarityError> {
    let Some(seed) = store::fetch_movie_for_embedding(conn, movie_id)
        .map_err(SimilarityError::StoreIo)?
    else {
        return Ok(false);
    };
    embed_seed(conn, embedder, &seed).await?;
    Ok(true)
}

async fn embed_seed(
    conn: &Connection,
    embedder: &SharedEmbedder,
    movie: &MovieSeed,
) -> Result<(), SimilarityError> {
    let text = compose_embedding_text(
        &movie.name,
        movie.director.as_deref(),
        movie.synopsis.as_deref(),
    );
    let vector = embedder.embed(&text).await?;
    index::upsert(conn, movie.id, &vector)?;
    store::update_embedding_text(conn, movie.id, &text).map_err(SimilarityError::StoreIo)?;
    Ok(())
}
