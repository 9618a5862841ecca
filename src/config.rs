use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CinesimConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of neighbors returned by a similarity query.
    pub default_limit: usize,
    /// Minimum cosine similarity for query results. 0.0 disables the floor.
    pub min_similarity: f64,
    /// Candidate over-fetch multiplier for thresholded search. The vec0 KNN
    /// has no similarity-floor predicate, so thresholded search fetches
    /// `limit * overfetch_factor` ranked candidates and filters. Must be >= 2.
    pub overfetch_factor: usize,
    /// Deadline for a single embedding call, in seconds.
    pub embed_timeout_secs: u64,
}

impl Default for CinesimConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_cinesim_dir()
            .join("movies.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_cinesim_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            min_similarity: 0.0,
            overfetch_factor: 3,
            embed_timeout_secs: 120,
        }
    }
}

/// Returns `~/.cinesim/`
pub fn default_cinesim_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".cinesim")
}

/// Returns the default config file path: `~/.cinesim/config.toml`
pub fn default_config_path() -> PathBuf {
    default_cinesim_dir().join("config.toml")
}

impl CinesimConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CinesimConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CINESIM_DB, CINESIM_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from a key lookup. Split out from the env reader so
    /// tests can inject values without touching process-global state.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CINESIM_DB") {
            self.storage.db_path = val;
        }
        if let Some(val) = lookup("CINESIM_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Deadline applied to a single embedding call.
    pub fn embed_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.search.embed_timeout_secs)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
