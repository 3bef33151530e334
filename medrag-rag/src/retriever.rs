//! Top-k retrieval over the vector store.

use std::sync::Arc;

use tracing::debug;

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// Wraps the vector index with a fixed top-k lookup policy.
///
/// The embedding provider here must be the one the corpus was ingested
/// with. Results come back in descending similarity order; no minimum
/// score is applied, so a corpus with no good match still returns the
/// k nearest entries.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self { embedder, store, top_k }
    }

    /// The configured number of results per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query and return its top-k nearest passages.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.query(&embedding, self.top_k).await?;
        debug!(result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}
