//! CLI `stats` command — embedding coverage at a glance.

use anyhow::{Context, Result};

use crate::config::CinesimConfig;
use crate::similarity::index;
use crate::store;

/// Display movie and vector counts in the terminal.
pub fn stats(config: &CinesimConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path).context("failed to open database")?;

    let movies = store::count_movies(&conn)?;
    let vectors = index::count(&conn)?;
    let with_text = store::count_with_embedding_text(&conn)?;
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    println!("Similarity Index Statistics");
    println!("{}", "=".repeat(40));
    println!("  Movies:               {movies}");
    println!("  Vectors:              {vectors}");
    println!("  With embedding text:  {with_text}");
    if movies > 0 {
        let coverage = vectors as f64 / movies as f64 * 100.0;
        println!("  Coverage:             {coverage:.1}%");
    }
    println!("  Database size:        {db_size} bytes");

    if vectors < movies {
        println!();
        println!("Run `cinesim rebuild` to embed the remaining movies.");
    }

    Ok(())
}
