//! Google Gemini provider.
//!
//! Talks to the Generative Language API: `generateContent` for
//! non-streaming calls and `streamGenerateContent?alt=sse` for
//! streaming. The assistant role maps to Gemini's `model` role.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use medrag_core::{CoreError, GenerationConfig, Llm, LlmRequest, Result, Role, TextStream};

/// Default Generative Language API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Connection timeout. No total-request timeout is set: a streamed
/// generation legitimately stays open for the whole response.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`GeminiModel`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (`GOOGLE_API_KEY`).
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Default decoding parameters, used when the request carries none.
    pub generation: GenerationConfig,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
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

/// An [`Llm`] backed by the Gemini API.
pub struct GeminiModel {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiModel {
    /// Create a new provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the API key is empty.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(CoreError::Config("Gemini API key must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Model(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{method}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_body(&self, request: &LlmRequest) -> GenerateContentRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                },
                parts: vec![Part { text: turn.text.clone() }],
            })
            .collect();

        let generation = request.config.unwrap_or(self.config.generation);
        GenerateContentRequest {
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|text| SystemInstruction { parts: vec![Part { text: text.clone() }] }),
            contents,
            generation_config: WireGenerationConfig {
                temperature: generation.temperature,
                max_output_tokens: generation.max_output_tokens,
            },
        }
    }

    async fn post(&self, url: String, body: &GenerateContentRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                CoreError::Model(format!("Gemini request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(provider = "Gemini", %status, "API error");
            return Err(CoreError::Model(format!("Gemini API returned {status}: {detail}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl Llm for GeminiModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: LlmRequest) -> Result<String> {
        debug!(provider = "Gemini", model = %self.config.model, "generate");

        let body = self.build_body(&request);
        let response = self.post(self.method_url("generateContent"), &body).await?;

        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            CoreError::Model(format!("failed to parse Gemini response: {e}"))
        })?;

        generated
            .text()
            .ok_or_else(|| CoreError::Model("Gemini response had no candidates".into()))
    }

    async fn generate_stream(&self, request: LlmRequest) -> Result<TextStream> {
        debug!(provider = "Gemini", model = %self.config.model, "generate_stream");

        let body = self.build_body(&request);
        let url = format!("{}?alt=sse", self.method_url("streamGenerateContent"));
        let response = self.post(url, &body).await?;

        let stream = try_stream! {
            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                let event = event
                    .map_err(|e| CoreError::Model(format!("Gemini stream error: {e}")))?;
                let chunk: GenerateContentResponse = serde_json::from_str(&event.data)
                    .map_err(|e| CoreError::Model(format!("failed to parse stream chunk: {e}")))?;
                if let Some(fragment) = chunk.text() {
                    if !fragment.is_empty() {
                        yield fragment;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let content = candidate.content?;
        if content.parts.is_empty() {
            return None;
        }
        Some(content.parts.into_iter().map(|p| p.text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_core::Turn;

    #[test]
    fn rejects_empty_key() {
        let result = GeminiModel::new(GeminiConfig::new(""));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn assistant_turns_map_to_model_role() {
        let model = GeminiModel::new(GeminiConfig::new("key")).unwrap();
        let request = LlmRequest::new(vec![Turn::user("q"), Turn::assistant("a")])
            .with_system_instruction("sys");
        let body = model.build_body(&request);

        assert!(body.system_instruction.is_some());
        assert_eq!(body.contents[0].role, "user");
        assert_eq!(body.contents[1].role, "model");
    }

    #[test]
    fn parses_streamed_candidate_text() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":" there"}],"role":"model"}}]}"#;
        let chunk: GenerateContentResponse = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.text().as_deref(), Some("Hello there"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let chunk: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(chunk.text().is_none());
    }
}
