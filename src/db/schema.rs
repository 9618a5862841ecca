//! SQL DDL for the cinesim tables.
//!
//! Defines the `movies` table (display metadata plus the audit copy of the
//! text each embedding was generated from) and the `movie_vectors` vec0
//! virtual table. All DDL uses `IF NOT EXISTS` for idempotent initialization.
//!
//! The integer movie id is the contract between the two tables: `movies` owns
//! display metadata, `movie_vectors` owns embeddings, and nothing links them
//! transactionally. A movie deleted from `movies` can leave an orphaned
//! vector until the deletion path calls `similarity::index::delete`.

use rusqlite::Connection;

/// Relational side: movie records consumed for rebuilds and hydration.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    director TEXT,
    synopsis TEXT,
    image_cover TEXT,
    embedding_text TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_movies_name ON movies(name);
"#;

/// vec0 virtual table must be created separately (sqlite-vec syntax).
///
/// `distance_metric=cosine` makes KNN `distance` the cosine distance, so
/// similarity is `1 - distance`.
const VEC_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS movie_vectors USING vec0(
    movie_id INTEGER PRIMARY KEY,
    embedding FLOAT[384] distance_metric=cosine
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS), safe to run
/// on every process start; never destroys existing data.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VEC_TABLE_SQL)?;
    Ok(())
}
