//! Error types shared across MedRAG crates.

use thiserror::Error;

/// Errors produced by LLM providers and core validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The underlying model capability failed (HTTP error, bad
    /// response, stream interruption).
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid or missing configuration, detected at construction time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input, rejected before any external call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
