//! Text-to-vector embedding for the knowledge index.
//!
//! [`EmbeddingProvider`] produces 384-dimension L2-normalized vectors
//! (all-MiniLM-L6-v2 via ONNX Runtime). Methods are synchronous; async callers
//! wrap them in `tokio::task::spawn_blocking`.

pub mod local;

use anyhow::Result;

/// Dimensions of the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text string.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Create an embedding provider from config. Only `"local"` is supported;
/// model files must already be present (`skycast model download`).
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => Ok(Box::new(local::MiniLmEmbedder::new(config)?)),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}
