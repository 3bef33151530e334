//! Pinecone vector store backend.
//!
//! Thin client over the Pinecone REST data plane (`/vectors/upsert`,
//! `/query`, `/vectors/delete`, `/describe_index_stats`). The index
//! host is resolved once from the index name via the control plane at
//! construction time, so a missing or misnamed index fails at startup
//! rather than mid-request.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Pinecone control-plane endpoint, used only to resolve index hosts.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Pinned API version header value.
const API_VERSION: &str = "2025-01";

/// Per-request timeout for data-plane and control-plane calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| store_error(format!("failed to build HTTP client: {e}")))
}

/// A [`VectorStore`] backed by a Pinecone serverless index.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    /// Data-plane base URL, e.g. `https://my-index-abc123.svc.region.pinecone.io`.
    host: String,
    namespace: String,
}

impl PineconeVectorStore {
    /// Connect to an index by name, resolving its data-plane host via
    /// the control plane.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] when the API key is empty and
    /// [`RagError::VectorStore`] when the index cannot be described
    /// (wrong name, bad credentials, network failure).
    pub async fn connect(api_key: impl Into<String>, index_name: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("Pinecone API key must not be empty".into()));
        }
        if index_name.is_empty() {
            return Err(RagError::Config("Pinecone index name must not be empty".into()));
        }

        let client = build_client()?;
        let url = format!("{CONTROL_PLANE_URL}/indexes/{index_name}");
        let response = client
            .get(&url)
            .header("Api-Key", &api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| store_error(format!("failed to describe index '{index_name}': {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(store_error(format!(
                "describe index '{index_name}' returned {status}: {detail}"
            )));
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| store_error(format!("failed to parse describe response: {e}")))?;

        info!(index = index_name, host = %described.host, "connected to Pinecone index");

        Ok(Self {
            client,
            api_key,
            host: format!("https://{}", described.host),
            namespace: String::new(),
        })
    }

    /// Build a store from an already-known data-plane host, skipping
    /// the control-plane lookup.
    pub fn with_host(api_key: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.into(),
            host: host.into(),
            namespace: String::new(),
        })
    }

    /// Scope all operations to a namespace (default: the empty
    /// namespace).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{path}", self.host);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "Pinecone", error = %e, path, "request failed");
                store_error(format!("request to {path} failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<PineconeErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            error!(backend = "Pinecone", %status, path, "API error");
            return Err(store_error(format!("{path} returned {status}: {detail}")));
        }

        response
            .json()
            .await
            .map_err(|e| store_error(format!("failed to parse {path} response: {e}")))
    }
}

fn store_error(message: String) -> RagError {
    RagError::VectorStore { backend: "Pinecone".into(), message }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Deserialize)]
struct PineconeErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<PineconeVector>,
    namespace: String,
}

#[derive(Serialize, Deserialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    metadata: ChunkMetadata,
}

/// Provenance metadata stored alongside each vector. Pinecone metadata
/// numbers are floats, so the page index travels as `f64`.
#[derive(Serialize, Deserialize)]
struct ChunkMetadata {
    text: String,
    source: String,
    page: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    #[allow(dead_code)]
    upserted_count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    namespace: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<ChunkMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let vectors = chunks
            .iter()
            .map(|chunk| PineconeVector {
                id: chunk.id.clone(),
                values: chunk.embedding.clone(),
                metadata: ChunkMetadata {
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    page: chunk.page as f64,
                },
            })
            .collect();

        debug!(backend = "Pinecone", count = chunks.len(), "upserting vectors");
        let _: UpsertResponse = self
            .post("/vectors/upsert", &UpsertRequest { vectors, namespace: self.namespace.clone() })
            .await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let request = QueryRequest {
            vector: embedding.to_vec(),
            top_k,
            include_metadata: true,
            namespace: self.namespace.clone(),
        };

        let response: QueryResponse = self.post("/query", &request).await?;

        Ok(response
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(SearchResult {
                    chunk: Chunk {
                        id: m.id,
                        text: metadata.text,
                        embedding: Vec::new(),
                        source: metadata.source,
                        page: metadata.page as usize,
                    },
                    score: m.score,
                })
            })
            .collect())
    }

    async fn delete_all(&self) -> Result<()> {
        info!(backend = "Pinecone", namespace = %self.namespace, "deleting all vectors");
        let body = json!({ "deleteAll": true, "namespace": self.namespace });
        let _: serde_json::Value = self.post("/vectors/delete", &body).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let stats: IndexStatsResponse = self.post("/describe_index_stats", &json!({})).await?;
        if self.namespace.is_empty() {
            Ok(stats.total_vector_count)
        } else {
            Ok(stats.namespaces.get(&self.namespace).map_or(0, |ns| ns.vector_count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_missing_credentials() {
        assert!(matches!(
            PineconeVectorStore::connect("", "medical-index").await,
            Err(RagError::Config(_))
        ));
        assert!(matches!(
            PineconeVectorStore::connect("key", "").await,
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn query_request_uses_pinecone_field_names() {
        let request = QueryRequest {
            vector: vec![0.1],
            top_k: 3,
            include_metadata: true,
            namespace: String::new(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("topK").is_some());
        assert!(body.get("includeMetadata").is_some());
    }

    #[test]
    fn parses_query_matches() {
        let data = r#"{"matches":[{"id":"x","score":0.9,"metadata":{"text":"passage","source":"a.pdf","page":2.0}}],"namespace":""}"#;
        let response: QueryResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.matches.len(), 1);
        let metadata = response.matches[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.page as usize, 2);
    }
}
