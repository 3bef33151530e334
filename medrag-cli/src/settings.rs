//! Environment-driven settings for the binary.

use anyhow::{bail, Result};

use medrag_core::GenerationConfig;

/// Which hosted model answers questions. Chosen once at startup; the
/// rest of the pipeline only ever sees the `Llm` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Llama,
    Gemini,
}

/// Credentials and model parameters read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub generation: GenerationConfig,
    pub pinecone_index: String,
    pub pinecone_api_key: String,
    pub hf_api_token: String,
    pub google_api_key: Option<String>,
}

impl Settings {
    /// Read settings from the environment, failing fast on anything
    /// missing or malformed so no request is ever attempted with a
    /// broken configuration.
    ///
    /// Required: `PINECONE_INDEX_NAME`, `PINECONE_API_KEY`,
    /// `HUGGINGFACEHUB_API_TOKEN`, and `GOOGLE_API_KEY` when
    /// `MODEL_PROVIDER=gemini`.
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var("MODEL_PROVIDER").as_deref() {
            Ok("llama") | Err(_) => Provider::Llama,
            Ok("gemini") => Provider::Gemini,
            Ok(other) => bail!("MODEL_PROVIDER must be 'llama' or 'gemini', got '{other}'"),
        };

        let temperature_key = match provider {
            Provider::Llama => "LLAMA_TEMPERATURE",
            Provider::Gemini => "GEMINI_TEMPERATURE",
        };
        let mut generation = GenerationConfig::default();
        if let Some(temperature) = optional_parsed::<f32>(temperature_key)? {
            generation.temperature = temperature;
        }
        if let Some(max_tokens) = optional_parsed::<u32>("MAX_TOKENS")? {
            generation.max_output_tokens = max_tokens;
        }

        let google_api_key = std::env::var("GOOGLE_API_KEY").ok();
        if provider == Provider::Gemini && google_api_key.is_none() {
            bail!("GOOGLE_API_KEY must be set when MODEL_PROVIDER=gemini");
        }

        Ok(Self {
            provider,
            generation,
            pinecone_index: required("PINECONE_INDEX_NAME")?,
            pinecone_api_key: required("PINECONE_API_KEY")?,
            hf_api_token: required("HUGGINGFACEHUB_API_TOKEN")?,
            google_api_key,
        })
    }
}

fn required(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{key} must be set (add it to your environment or .env file)"),
    }
}

fn optional_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => bail!("{key} has invalid value '{value}'"),
        },
        Err(_) => Ok(None),
    }
}
