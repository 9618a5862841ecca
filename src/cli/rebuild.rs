//! CLI `rebuild` command — regenerate every movie's embedding.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CinesimConfig;
use crate::db;
use crate::embedding::SharedEmbedder;
use crate::similarity::rebuild::rebuild_all;
use crate::store;

/// Rebuild all vectors with the currently configured model.
pub async fn rebuild(config: &CinesimConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path).context("failed to open database")?;

    let total = store::count_movies(&conn)?;
    if total == 0 {
        println!("No movies to embed.");
        return Ok(());
    }

    println!(
        "Embedding {total} movies with model '{}'...",
        config.embedding.model
    );

    let embedder = SharedEmbedder::new(config.embedding.clone(), config.embed_timeout());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("##-"),
    );

    let summary = rebuild_all(&conn, &embedder, Some(&pb)).await?;
    pb.finish_and_clear();

    if summary.failed > 0 {
        println!(
            "Embedded {}/{} movies ({} failed — see log for details).",
            summary.embedded, summary.total, summary.failed
        );
    } else {
        println!("Embedded {} movies.", summary.embedded);
    }
    Ok(())
}
