//! Hugging Face feature-extraction embedding provider.
//!
//! Calls the hosted inference API for a sentence-transformers model.
//! The default model (`sentence-transformers/all-mpnet-base-v2`,
//! 768 dimensions) matches what the ingestion side of the corpus was
//! built with and must not be changed independently of the index.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default base URL of the hosted inference API.
const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Default sentence-transformers embedding model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";

/// Dimensionality of `all-mpnet-base-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 768;

/// Per-request timeout; embedding calls are small and should never
/// block an ingestion batch indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// An [`EmbeddingProvider`] backed by the Hugging Face inference API.
pub struct HuggingFaceEmbeddingProvider {
    client: reqwest::Client,
    api_token: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl HuggingFaceEmbeddingProvider {
    /// Create a new provider with the given API token and the default
    /// model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the token is empty.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: "API token must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_token,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Override the model and its dimensionality together.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/pipeline/feature-extraction",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "HuggingFace".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "HuggingFace",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_token)
            .json(&FeatureExtractionRequest { inputs: texts.to_vec() })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "HuggingFace", error = %e, "request failed");
                RagError::Embedding {
                    provider: "HuggingFace".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);
            error!(provider = "HuggingFace", %status, "API error");
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            error!(provider = "HuggingFace", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_token() {
        assert!(HuggingFaceEmbeddingProvider::new("").is_err());
    }

    #[test]
    fn endpoint_includes_model() {
        let provider = HuggingFaceEmbeddingProvider::new("token").unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-mpnet-base-v2/pipeline/feature-extraction"
        );
        assert_eq!(provider.dimensions(), 768);
    }
}
