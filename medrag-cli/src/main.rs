//! `medrag` — retrieval-augmented assistant over a medical PDF corpus.

mod chat;
mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use medrag_rag::RagConfig;
use settings::Settings;

#[derive(Parser)]
#[command(name = "medrag", version, about = "Chat with your medical documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest every PDF in the data directory into the vector index
    Ingest,
    /// Ingest a single PDF file into the vector index
    Add {
        /// Path to the PDF file
        file: PathBuf,
    },
    /// Start an interactive chat session
    Chat,
    /// Delete all entries from the vector index (asks for confirmation)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("reading configuration")?;
    let config = RagConfig::from_env().context("reading pipeline configuration")?;

    match cli.command {
        Command::Ingest => commands::ingest(&settings, &config).await,
        Command::Add { file } => commands::add(&settings, &config, &file).await,
        Command::Chat => {
            let orchestrator = commands::build_orchestrator(&settings, &config).await?;
            chat::run(&orchestrator).await
        }
        Command::Reset => commands::reset(&settings).await,
    }
}
