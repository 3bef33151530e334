//! In-memory vector store using cosine similarity.
//!
//! Suitable for development and tests; the production backend is
//! [`crate::PineconeVectorStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] backed by a `HashMap` behind a
/// `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, Chunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.id.is_empty() {
                return Err(RagError::VectorStore {
                    backend: "InMemory".into(),
                    message: "chunk has no id assigned".into(),
                });
            }
        }
        let mut entries = self.entries.write().await;
        for chunk in chunks {
            entries.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        let mut scored: Vec<SearchResult> = entries
            .values()
            .map(|chunk| SearchResult {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_all(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk { id: id.into(), text: format!("text {id}"), embedding, source: "t.pdf".into(), page: 0 }
    }

    #[tokio::test]
    async fn upsert_requires_ids() {
        let store = InMemoryVectorStore::new();
        let unassigned = Chunk::new("text", "t.pdf", 0);
        assert!(store.upsert(&[unassigned]).await.is_err());
    }

    #[tokio::test]
    async fn query_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[
                chunk("a", vec![1.0, 0.0]),
                chunk("b", vec![0.0, 1.0]),
                chunk("c", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "a");
        assert_eq!(results[1].chunk.id, "c");
    }

    #[tokio::test]
    async fn delete_all_empties_the_index() {
        let store = InMemoryVectorStore::new();
        store.upsert(&[chunk("a", vec![1.0])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        store.delete_all().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
