//! The ingestion pipeline: load → chunk → embed → upsert.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunking::Chunker;
use crate::document::{Chunk, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader;
use crate::vectorstore::VectorStore;

/// Outcome counters for one bulk ingestion run.
///
/// A run with `batches_failed > 0` is a partial ingestion: the
/// successful batches are in the index, the failed ones are not, and
/// nothing is retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub pages_loaded: usize,
    pub chunks_produced: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
}

/// Coordinates chunking, embedding, and vector-index writes.
///
/// Construct one via [`IngestionPipeline::builder()`].
pub struct IngestionPipeline {
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Bulk-ingest every PDF in a directory.
    ///
    /// Documents load concurrently on the blocking pool; a file that
    /// fails to load is logged and skipped. All loaded pages are then
    /// chunked together and written in batches of `batch_size`; a
    /// failed batch (embedding or upsert) is logged and the run
    /// continues with the next batch.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] only when the directory itself
    /// cannot be read. Per-file and per-batch failures are reported in
    /// the [`IngestReport`], not as errors.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestReport> {
        let paths = loader::discover_pdfs(dir)?;
        if paths.is_empty() {
            info!(dir = %dir.display(), "no documents found");
            return Ok(IngestReport::default());
        }

        info!(dir = %dir.display(), files = paths.len(), "loading documents");

        // Loads are independent; run them concurrently and join before
        // chunking, since batching is done over the whole corpus.
        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| tokio::task::spawn_blocking(move || loader::load_pdf(&path)))
            .collect();

        let mut documents = Vec::new();
        let mut files_skipped = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(document)) => documents.push(document),
                Ok(Err(e)) => {
                    warn!(error = %e, "skipping document");
                    files_skipped += 1;
                }
                Err(e) => {
                    error!(error = %e, "document load task failed");
                    files_skipped += 1;
                }
            }
        }

        let mut report = self.ingest_corpus(&documents).await?;
        report.files_skipped = files_skipped;
        Ok(report)
    }

    /// Chunk, embed, and upsert a set of already-loaded documents in
    /// batches. See [`ingest_directory`](Self::ingest_directory) for
    /// the failure policy.
    pub async fn ingest_corpus(&self, documents: &[Document]) -> Result<IngestReport> {
        let mut report = IngestReport {
            files_loaded: documents.len(),
            pages_loaded: documents.iter().map(|d| d.pages.len()).sum(),
            ..IngestReport::default()
        };

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in documents {
            chunks.extend(self.chunker.split(document));
        }
        report.chunks_produced = chunks.len();

        for batch in chunks.chunks_mut(self.batch_size) {
            match self.embed_and_upsert(batch).await {
                Ok(()) => report.batches_succeeded += 1,
                Err(e) => {
                    error!(error = %e, batch_size = batch.len(), "batch failed, continuing");
                    report.batches_failed += 1;
                }
            }
        }

        info!(
            files = report.files_loaded,
            pages = report.pages_loaded,
            chunks = report.chunks_produced,
            batches_succeeded = report.batches_succeeded,
            batches_failed = report.batches_failed,
            "bulk ingestion finished"
        );
        Ok(report)
    }

    /// Ingest a single file: load, chunk, embed, upsert — one upsert
    /// call, completing or failing cleanly before the caller proceeds.
    ///
    /// Returns the number of chunks written.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] when the file cannot be loaded (in
    /// which case nothing was attempted), or the embedding/vector
    /// store error when a later stage fails.
    pub async fn ingest_file(&self, path: &Path) -> Result<usize> {
        let owned = path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || loader::load_pdf(&owned))
            .await
            .map_err(|e| RagError::Pipeline(format!("document load task failed: {e}")))??;
        self.ingest_document(&document).await
    }

    /// Ingest one already-loaded document in a single embed + upsert
    /// call. Any failure propagates; no partial state is reported as
    /// success.
    pub async fn ingest_document(&self, document: &Document) -> Result<usize> {
        let mut chunks = self.chunker.split(document);
        if chunks.is_empty() {
            info!(source = %document.source, chunk_count = 0, "ingested document (empty)");
            return Ok(0);
        }

        self.embed_and_upsert(&mut chunks).await?;
        info!(source = %document.source, chunk_count = chunks.len(), "ingested document");
        Ok(chunks.len())
    }

    /// Embed a batch, assign fresh entry ids, and upsert it.
    ///
    /// Ids are random per upsert, so the index appends on re-ingestion
    /// instead of overwriting (replace semantics require an explicit
    /// delete-all first).
    async fn embed_and_upsert(&self, chunks: &mut [Chunk]) -> Result<()> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.id = Uuid::new_v4().to_string();
            chunk.embedding = embedding;
        }

        self.store.upsert(chunks).await
    }
}

/// Builder for an [`IngestionPipeline`]. All fields are required
/// except `batch_size` (default 100).
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    batch_size: Option<usize>,
}

impl IngestionPipelineBuilder {
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Build the pipeline, validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or
    /// `batch_size` is zero.
    pub fn build(self) -> Result<IngestionPipeline> {
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".into()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".into()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".into()))?;
        let batch_size = self.batch_size.unwrap_or(100);
        if batch_size == 0 {
            return Err(RagError::Config("batch_size must be greater than zero".into()));
        }

        Ok(IngestionPipeline { chunker, embedder, store, batch_size })
    }
}
