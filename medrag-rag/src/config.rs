//! Configuration for the ingestion and retrieval pipeline.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Pipeline parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Number of results returned by retrieval.
    pub top_k: usize,
    /// Chunks per upsert batch during bulk ingestion.
    pub batch_size: usize,
    /// Directory scanned by bulk ingestion.
    pub data_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            batch_size: 100,
            data_dir: PathBuf::from("data/raw"),
        }
    }
}

impl RagConfig {
    /// Create a new builder.
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a config from environment variables, falling back to
    /// defaults for unset keys: `CHUNK_SIZE`, `CHUNK_OVERLAP`,
    /// `RETRIEVAL_K`, `INGEST_BATCH_SIZE`, `DATA_DIR`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] for unparseable values or
    /// inconsistent parameters, so misconfiguration fails at startup
    /// rather than mid-request.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(size) = env_parse::<usize>("CHUNK_SIZE")? {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = env_parse::<usize>("CHUNK_OVERLAP")? {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = env_parse::<usize>("RETRIEVAL_K")? {
            builder = builder.top_k(k);
        }
        if let Some(batch) = env_parse::<usize>("INGEST_BATCH_SIZE")? {
            builder = builder.batch_size(batch);
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            builder = builder.data_dir(dir);
        }
        builder.build()
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{key} has invalid value '{value}'"))),
        Err(_) => Ok(None),
    }
}

/// Builder for a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Build the config, validating parameter consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_overlap >= chunk_size`,
    /// or `top_k`/`batch_size` is zero.
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".into()));
        }
        if self.config.batch_size == 0 {
            return Err(RagError::Config("batch_size must be greater than zero".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn overlap_must_be_less_than_size() {
        let result = RagConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }

    #[test]
    fn top_k_must_be_positive() {
        let result = RagConfig::builder().top_k(0).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
