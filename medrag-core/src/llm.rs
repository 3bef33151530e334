//! The [`Llm`] trait and its request types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::content::Turn;
use crate::error::Result;

/// A lazy, one-shot sequence of text fragments from a streaming
/// generation call.
///
/// Fragments concatenate to the full answer. The sequence is not
/// restartable; dropping it cancels the underlying request and releases
/// its network resources.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Decoding parameters applied to a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of output tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.3, max_output_tokens: 512 }
    }
}

/// A provider-agnostic generation request: an optional system
/// instruction, the conversation so far, and decoding parameters.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    pub config: Option<GenerationConfig>,
}

impl LlmRequest {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { system_instruction: None, turns, config: None }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A hosted language-model capability.
///
/// Two interchangeable providers sit behind this trait (a hosted open
/// model and a third-party hosted model); the conversational pipeline is
/// agnostic to which one is active. The provider is chosen once at
/// construction time from configuration.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier this provider is bound to.
    fn name(&self) -> &str;

    /// Generate the full response text for a request.
    ///
    /// The default implementation drains [`generate_stream`](Llm::generate_stream)
    /// and concatenates the fragments. Providers with a dedicated
    /// non-streaming endpoint should override it.
    async fn generate(&self, request: LlmRequest) -> Result<String> {
        let mut stream = self.generate_stream(request).await?;
        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    /// Generate the response as a stream of text fragments.
    async fn generate_stream(&self, request: LlmRequest) -> Result<TextStream>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    struct Fragments(Vec<&'static str>);

    #[async_trait]
    impl Llm for Fragments {
        fn name(&self) -> &str {
            "fragments"
        }

        async fn generate_stream(&self, _request: LlmRequest) -> Result<TextStream> {
            let parts = self.0.clone();
            Ok(Box::pin(futures::stream::iter(
                parts.into_iter().map(|p| Ok::<_, CoreError>(p.to_string())),
            )))
        }
    }

    #[tokio::test]
    async fn default_generate_concatenates_stream() {
        let llm = Fragments(vec!["Hel", "lo ", "world"]);
        let text = llm.generate(LlmRequest::default()).await.unwrap();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_output_tokens, 512);
    }
}
