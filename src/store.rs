//! Relational movie store.
//!
//! The three shapes the engine consumes from the relational side
//! ([`fetch_movies_for_embedding`], [`fetch_movies_by_ids`],
//! [`update_embedding_text`]) plus a seeding hook for ingestion and tests.
//! Hydration is always one batched, parameterized query — never N+1, never
//! string-concatenated id lists.

use rusqlite::{params, Connection, Result};
use serde::Serialize;

/// Fields of a movie relevant to embedding generation.
#[derive(Debug, Clone)]
pub struct MovieSeed {
    pub id: i64,
    pub name: String,
    pub director: Option<String>,
    pub synopsis: Option<String>,
}

/// Display projection used to hydrate similarity results.
#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    pub id: i64,
    pub name: String,
    pub image_cover: Option<String>,
}

/// Fetch every movie with its embedding-relevant fields.
pub fn fetch_movies_for_embedding(conn: &Connection) -> Result<Vec<MovieSeed>> {
    let mut stmt =
        conn.prepare("SELECT id, name, director, synopsis FROM movies ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MovieSeed {
                id: row.get(0)?,
                name: row.get(1)?,
                director: row.get(2)?,
                synopsis: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

/// Fetch a single movie's embedding-relevant fields.
pub fn fetch_movie_for_embedding(conn: &Connection, id: i64) -> Result<Option<MovieSeed>> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT id, name, director, synopsis FROM movies WHERE id = ?1",
        params![id],
        |row| {
            Ok(MovieSeed {
                id: row.get(0)?,
                name: row.get(1)?,
                director: row.get(2)?,
                synopsis: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Batch-fetch display projections by id, in one parameterized IN query.
///
/// Row order follows the database, not the input — callers that care about
/// ranking re-sort against their own id order.
pub fn fetch_movies_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<MovieCard>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, name, image_cover FROM movies WHERE id IN ({})",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::types::ToSql> = ids
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();

    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok(MovieCard {
                id: row.get(0)?,
                name: row.get(1)?,
                image_cover: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

/// Record the exact text an embedding was generated from.
pub fn update_embedding_text(conn: &Connection, id: i64, text: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE movies SET embedding_text = ?1, updated_at = ?2 WHERE id = ?3",
        params![text, now, id],
    )?;
    Ok(())
}

/// Stored embedding text for a movie, if any.
pub fn embedding_text(conn: &Connection, id: i64) -> Result<Option<String>> {
    use rusqlite::OptionalExtension;
    Ok(conn
        .query_row(
            "SELECT embedding_text FROM movies WHERE id = ?1",
            params![id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten())
}

/// Insert or replace a movie record. Seeding hook for ingestion and tests.
pub fn upsert_movie(
    conn: &Connection,
    id: i64,
    name: &str,
    director: Option<&str>,
    synopsis: Option<&str>,
    image_cover: Option<&str>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO movies (id, name, director, synopsis, image_cover, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, director = excluded.director, \
             synopsis = excluded.synopsis, image_cover = excluded.image_cover, \
             updated_at = excluded.updated_at",
        params![id, name, director, synopsis, image_cover, now],
    )?;
    Ok(())
}

/// Total movie count.
pub fn count_movies(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
}

/// Movies that carry a recorded embedding text.
pub fn count_with_embedding_text(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM movies WHERE embedding_text IS NOT NULL",
        [],
        |row| row.get(0),
    )
}
