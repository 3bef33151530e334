//! Error types for the `medrag-rag` crate.
//!
//! Failures from external capabilities (PDF parsing, embedding API,
//! vector index) are converted to one of these kinds at the component
//! boundary that invoked them, with the original diagnostic preserved.

use thiserror::Error;

use medrag_core::CoreError;

/// Errors that can occur in ingestion and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document could not be read or parsed.
    #[error("Load error ({source_path}): {message}")]
    Load {
        /// Path of the document that failed to load.
        source_path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend (upsert, query,
    /// or delete).
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error, raised at construction time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An error propagated from `medrag-core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
