mod cli;
mod config;
mod db;
mod embedding;
mod similarity;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cinesim", version, about = "Movie semantic-similarity engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild embeddings for every movie in the database
    Rebuild,
    /// Find movies similar to the given movie id
    Similar {
        /// Movie id to query neighbors for
        movie_id: i64,
        /// Movie ids to exclude from results (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<i64>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Minimum cosine similarity for results
        #[arg(long)]
        min_similarity: Option<f64>,
    },
    /// Show database statistics
    Stats,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.cinesim/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::CinesimConfig::load()?;

    // Log to stderr so stdout stays clean for JSON output.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Rebuild => {
            cli::rebuild::rebuild(&config).await?;
        }
        Command::Similar {
            movie_id,
            exclude,
            limit,
            min_similarity,
        } => {
            cli::similar::similar(&config, movie_id, &exclude, limit, min_similarity)?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
