//! Non-interactive subcommands: ingest, add, reset.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use medrag_chat::{AnswerGenerator, ChatOrchestrator, QueryRewriter};
use medrag_core::Llm;
use medrag_model::{GeminiConfig, GeminiModel, HuggingFaceConfig, HuggingFaceModel};
use medrag_rag::{
    EmbeddingProvider, HuggingFaceEmbeddingProvider, IngestionPipeline, PineconeVectorStore,
    RagConfig, RecursiveChunker, Retriever, VectorStore,
};

use crate::settings::{Provider, Settings};

/// Bulk-ingest every PDF under the configured data directory.
pub async fn ingest(settings: &Settings, config: &RagConfig) -> Result<()> {
    if !config.data_dir.is_dir() {
        println!(
            "Directory '{}' not found. Create it and add PDF documents first.",
            config.data_dir.display()
        );
        return Ok(());
    }

    let pipeline = build_pipeline(settings, config).await?;
    let report = pipeline.ingest_directory(&config.data_dir).await?;

    if report.files_loaded == 0 && report.files_skipped == 0 {
        println!("No PDF documents found in '{}'.", config.data_dir.display());
        return Ok(());
    }

    println!(
        "Ingested {} file(s) ({} pages, {} chunks); {} skipped.",
        report.files_loaded, report.pages_loaded, report.chunks_produced, report.files_skipped
    );
    if report.batches_failed > 0 {
        println!(
            "Warning: {} of {} batches failed and were not indexed.",
            report.batches_failed,
            report.batches_succeeded + report.batches_failed
        );
    }
    Ok(())
}

/// Ingest one PDF file into the index.
pub async fn add(settings: &Settings, config: &RagConfig, file: &Path) -> Result<()> {
    let pipeline = build_pipeline(settings, config).await?;
    let chunks = pipeline
        .ingest_file(file)
        .await
        .with_context(|| format!("ingesting '{}'", file.display()))?;
    println!("Ingested '{}' ({chunks} chunks).", file.display());
    Ok(())
}

/// Delete every entry in the vector index, gated behind a typed "yes".
pub async fn reset(settings: &Settings) -> Result<()> {
    print!(
        "This permanently deletes ALL data in index '{}'. Type 'yes' to confirm: ",
        settings.pinecone_index
    );
    io::stdout().flush()?;

    let mut confirmation = String::new();
    io::stdin().lock().read_line(&mut confirmation)?;
    if confirmation.trim().to_lowercase() != "yes" {
        println!("Operation cancelled.");
        return Ok(());
    }

    let store = connect_store(settings).await?;
    store.delete_all().await.context("deleting index contents")?;
    println!("Deleted all vectors from index '{}'.", settings.pinecone_index);
    Ok(())
}

/// Wire up the full conversational pipeline.
pub async fn build_orchestrator(settings: &Settings, config: &RagConfig) -> Result<ChatOrchestrator> {
    let llm = build_llm(settings)?;
    let retriever = Retriever::new(build_embedder(settings)?, connect_store(settings).await?, config.top_k);
    Ok(ChatOrchestrator::new(
        QueryRewriter::new(llm.clone()),
        retriever,
        AnswerGenerator::new(llm, settings.generation),
    ))
}

async fn build_pipeline(settings: &Settings, config: &RagConfig) -> Result<IngestionPipeline> {
    let pipeline = IngestionPipeline::builder()
        .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
        .embedder(build_embedder(settings)?)
        .store(connect_store(settings).await?)
        .batch_size(config.batch_size)
        .build()?;
    Ok(pipeline)
}

async fn connect_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store =
        PineconeVectorStore::connect(&settings.pinecone_api_key, &settings.pinecone_index)
            .await
            .with_context(|| format!("connecting to index '{}'", settings.pinecone_index))?;
    Ok(Arc::new(store))
}

fn build_embedder(settings: &Settings) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder = HuggingFaceEmbeddingProvider::new(&settings.hf_api_token)?;
    Ok(Arc::new(embedder))
}

fn build_llm(settings: &Settings) -> Result<Arc<dyn Llm>> {
    let llm: Arc<dyn Llm> = match settings.provider {
        Provider::Llama => {
            let config = HuggingFaceConfig::new(&settings.hf_api_token)
                .with_generation(settings.generation);
            Arc::new(HuggingFaceModel::new(config)?)
        }
        Provider::Gemini => {
            // Presence is validated in Settings::from_env.
            let api_key = settings
                .google_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("GOOGLE_API_KEY must be set"))?;
            let config = GeminiConfig::new(api_key).with_generation(settings.generation);
            Arc::new(GeminiModel::new(config)?)
        }
    };
    Ok(llm)
}
