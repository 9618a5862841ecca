//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait, a local ONNX implementation
//! (all-MiniLM-L6-v2, 384 dimensions, mean-pooled, L2-normalized), and
//! [`SharedEmbedder`], the lazily-initialized process-wide handle the rest of
//! the engine is given at startup.

pub mod local;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::OnceCell;

use crate::config::EmbeddingConfig;
use crate::similarity::SimilarityError;

/// Number of dimensions in the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly [`EMBEDDING_DIM`]
/// dimensions. All methods are synchronous — callers in async contexts should
/// use `tokio::task::spawn_blocking` (or go through [`SharedEmbedder`]).
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported (ONNX Runtime + all-MiniLM-L6-v2).
/// Returns an error if model files are not found — run `cinesim model download`
/// first.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}

/// Lazily-initialized, shared embedding handle.
///
/// Constructed once at startup from config and passed into the query service
/// and the bulk builder — no module-level globals. Model loading takes
/// seconds, so it is deferred until the first [`embed`](Self::embed) call:
///
/// - concurrent first callers share one in-flight load (the `OnceCell`
///   serializes initializers, so two model instances can never be created);
/// - a failed load is not cached — the cell stays empty and the next call
///   retries;
/// - every call runs on the blocking pool under a deadline, surfacing a stall
///   as [`SimilarityError::EmbeddingTimeout`].
pub struct SharedEmbedder {
    config: EmbeddingConfig,
    timeout: Duration,
    cell: OnceCell<Arc<dyn EmbeddingProvider>>,
}

impl SharedEmbedder {
    pub fn new(config: EmbeddingConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            cell: OnceCell::new(),
        }
    }

    /// Build a handle around an already-constructed provider. Used by tests
    /// and by embedders the host application manages itself.
    pub fn preloaded(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config: EmbeddingConfig::default(),
            timeout: Duration::from_secs(120),
            cell: OnceCell::new_with(Some(provider)),
        }
    }

    /// The underlying provider, loading the model on first use.
    pub async fn provider(&self) -> Result<Arc<dyn EmbeddingProvider>, SimilarityError> {
        let provider = self
            .cell
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let provider = tokio::task::spawn_blocking(move || create_provider(&config))
                    .await
                    .map_err(|e| anyhow::anyhow!("model load task failed: {e}"))??;
                Ok::<_, anyhow::Error>(Arc::from(provider))
            })
            .await
            .map_err(SimilarityError::EmbeddingUnavailable)?;
        Ok(Arc::clone(provider))
    }

    /// Embed one text on the blocking pool, bounded by the configured deadline.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, SimilarityError> {
        let provider = self.provider().await?;
        let text = text.to_string();
        let task = tokio::task::spawn_blocking(move || provider.embed(&text));

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(SimilarityError::EmbeddingTimeout(self.timeout)),
            Ok(Err(join_err)) => Err(SimilarityError::EmbeddingUnavailable(anyhow::anyhow!(
                "embedding task failed: {join_err}"
            ))),
            Ok(Ok(result)) => result.map_err(SimilarityError::EmbeddingUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl EmbeddingProvider for CountingProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0f32; EMBEDDING_DIM];
            v[0] = 1.0;
            Ok(v)
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            anyhow::bail!("inference backend is down")
        }
    }

    #[tokio::test]
    async fn preloaded_embedder_serves_vectors() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let embedder = SharedEmbedder::preloaded(provider.clone());

        let v = embedder.embed("Title: Heat.").await.unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inference_failure_maps_to_unavailable() {
        let embedder = SharedEmbedder::preloaded(Arc::new(FailingProvider));
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(err, SimilarityError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        // Point the loader at a config that cannot resolve, twice: the cell
        // must not latch the first failure.
        let config = EmbeddingConfig {
            provider: "no-such-provider".into(),
            ..EmbeddingConfig::default()
        };
        let embedder = SharedEmbedder::new(config, Duration::from_secs(5));

        assert!(embedder.provider().await.is_err());
        // Second attempt runs the initializer again rather than replaying a
        // cached failure.
        assert!(embedder.provider().await.is_err());
    }
}
