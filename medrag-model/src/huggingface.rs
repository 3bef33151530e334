//! Hugging Face chat-completions provider.
//!
//! Talks to the Hugging Face router's OpenAI-compatible
//! `/v1/chat/completions` endpoint, which fronts hosted open models such
//! as Meta Llama 3.1. Streaming uses server-sent events with the
//! standard `[DONE]` terminator.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use medrag_core::{CoreError, GenerationConfig, Llm, LlmRequest, Result, Role, TextStream};

/// Default chat-completions endpoint of the Hugging Face router.
const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";

/// Default hosted open model.
const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";

/// Connection timeout. No total-request timeout is set: a streamed
/// completion legitimately stays open for the whole generation.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`HuggingFaceModel`].
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// API token (`HUGGINGFACEHUB_API_TOKEN`).
    pub api_token: String,
    /// Model repo id, e.g. `meta-llama/Meta-Llama-3.1-8B-Instruct`.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Default decoding parameters, used when the request carries none.
    pub generation: GenerationConfig,
}

impl HuggingFaceConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

/// An [`Llm`] backed by a Hugging Face hosted open model.
pub struct HuggingFaceModel {
    client: reqwest::Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceModel {
    /// Create a new provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the API token is empty.
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(CoreError::Config("Hugging Face API token must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Model(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: &LlmRequest, stream: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if let Some(system) = &request.system_instruction {
            messages.push(ChatMessage { role: "system", content: system.clone() });
        }
        for turn in &request.turns {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(ChatMessage { role, content: turn.text.clone() });
        }

        let generation = request.config.unwrap_or(self.config.generation);
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: generation.temperature,
            max_tokens: generation.max_output_tokens,
            stream,
        }
    }

    async fn post(&self, body: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "HuggingFace", error = %e, "request failed");
                CoreError::Model(format!("Hugging Face request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "HuggingFace", %status, "API error");
            return Err(CoreError::Model(format!(
                "Hugging Face API returned {status}: {detail}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Llm for HuggingFaceModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: LlmRequest) -> Result<String> {
        debug!(provider = "HuggingFace", model = %self.config.model, "generate");

        let body = self.build_body(&request, false);
        let response = self.post(&body).await?;

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "HuggingFace", error = %e, "failed to parse response");
            CoreError::Model(format!("failed to parse Hugging Face response: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| CoreError::Model("Hugging Face response had no choices".into()))
    }

    async fn generate_stream(&self, request: LlmRequest) -> Result<TextStream> {
        debug!(provider = "HuggingFace", model = %self.config.model, "generate_stream");

        let body = self.build_body(&request, true);
        let response = self.post(&body).await?;

        let stream = try_stream! {
            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| {
                    CoreError::Model(format!("Hugging Face stream error: {e}"))
                })?;
                if event.data == "[DONE]" {
                    break;
                }
                let chunk: ChatChunk = serde_json::from_str(&event.data).map_err(|e| {
                    CoreError::Model(format!("failed to parse stream chunk: {e}"))
                })?;
                if let Some(fragment) = chunk.delta_text() {
                    if !fragment.is_empty() {
                        yield fragment;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

// ── Wire types (OpenAI-compatible chat completions) ────────────────

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

impl ChatChunk {
    fn delta_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_core::Turn;

    #[test]
    fn rejects_empty_token() {
        let result = HuggingFaceModel::new(HuggingFaceConfig::new(""));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn body_places_system_instruction_first() {
        let model = HuggingFaceModel::new(HuggingFaceConfig::new("token")).unwrap();
        let request = LlmRequest::new(vec![Turn::user("hi"), Turn::assistant("hello")])
            .with_system_instruction("be helpful");
        let body = model.build_body(&request, false);

        assert_eq!(body.messages.len(), 3);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");
        assert_eq!(body.messages[2].role, "assistant");
        assert_eq!(body.temperature, 0.3);
        assert_eq!(body.max_tokens, 512);
    }

    #[test]
    fn parses_stream_chunk_delta() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"},"index":0}]}"#;
        let chunk: ChatChunk = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.delta_text().as_deref(), Some("Hel"));
    }

    #[test]
    fn parses_final_chunk_without_content() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop","index":0}]}"#;
        let chunk: ChatChunk = serde_json::from_str(data).unwrap();
        assert!(chunk.delta_text().is_none());
    }
}
