//! Error types for the conversational pipeline.

use thiserror::Error;

/// Errors produced while answering a question.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The query rewriter's LLM call failed.
    #[error("query rewriting failed: {message}")]
    Rewrite { message: String },

    /// Answer generation failed, before or during streaming.
    #[error("answer generation failed: {message}")]
    Generation { message: String },

    /// The question was rejected before any work started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A retrieval-side failure (embedding or vector store).
    #[error(transparent)]
    Rag(#[from] medrag_rag::RagError),

    /// A failure from the shared core types.
    #[error(transparent)]
    Core(#[from] medrag_core::CoreError),
}

pub type Result<T> = std::result::Result<T, ChatError>;
