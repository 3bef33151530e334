//! # medrag-rag
//!
//! The document ingestion and retrieval pipeline for MedRAG: raw PDF
//! documents become overlapping text chunks with provenance, chunks are
//! embedded and upserted into a vector index, and queries come back as
//! scored passages ready for grounding an answer.
//!
//! ## Components
//!
//! - [`RecursiveChunker`] — separator-cascade splitting with overlap
//! - [`EmbeddingProvider`] — text → fixed-dimension vectors
//!   ([`HuggingFaceEmbeddingProvider`] in production)
//! - [`VectorStore`] — upsert / top-k query / delete-all
//!   ([`PineconeVectorStore`] in production, [`InMemoryVectorStore`]
//!   for development and tests)
//! - [`IngestionPipeline`] — bulk directory ingestion and single-file
//!   ingestion
//! - [`Retriever`] — fixed top-k lookup using the ingestion-time
//!   embedding provider
//!
//! The embedding model used at query time must be the one used at
//! ingestion time; both sides read it from the same configuration.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod huggingface;
pub mod ingest;
pub mod inmemory;
pub mod loader;
pub mod pinecone;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::RagConfig;
pub use document::{Chunk, Document, Page, Provenance, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use huggingface::HuggingFaceEmbeddingProvider;
pub use ingest::{IngestReport, IngestionPipeline};
pub use inmemory::InMemoryVectorStore;
pub use loader::{discover_pdfs, load_pdf};
pub use pinecone::PineconeVectorStore;
pub use retriever::Retriever;
pub use vectorstore::VectorStore;
