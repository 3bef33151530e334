//! Embedding provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that maps text to fixed-dimension vectors.
///
/// The same provider (same model, same version) must be used at
/// ingestion and query time; mixing embedding spaces silently degrades
/// relevance, so the active model is fixed by configuration rather
/// than checked at runtime.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts.
    ///
    /// The default implementation embeds sequentially; backends with
    /// native batch endpoints should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}
