//! Vector store trait.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A nearest-neighbor index of (vector, text, provenance) entries.
///
/// A store instance is bound to one index (and namespace, where the
/// backend has them) at construction time. Entries are created by
/// upsert, queried read-only, and removed only by [`delete_all`]
/// (`delete_all` is irreversible and gated behind explicit
/// confirmation at the CLI).
///
/// The index does not deduplicate by content: upserting the same chunk
/// text twice under fresh ids yields two entries.
///
/// [`delete_all`]: VectorStore::delete_all
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert entries. Chunks must have ids and embeddings assigned.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return the `top_k` entries nearest to `embedding`, ordered by
    /// descending similarity score. No score threshold is applied;
    /// absence of a good match still returns the k nearest.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Delete every entry in the index. Irreversible.
    async fn delete_all(&self) -> Result<()>;

    /// Number of entries currently in the index.
    async fn count(&self) -> Result<usize>;
}
