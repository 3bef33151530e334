//! # medrag-model
//!
//! LLM provider implementations for MedRAG.
//!
//! Two interchangeable providers implement [`medrag_core::Llm`]:
//!
//! - [`HuggingFaceModel`] — Meta Llama 3.1 (or any chat model) served
//!   through the Hugging Face router's OpenAI-compatible API
//! - [`GeminiModel`] — Google Gemini via the Generative Language API
//!
//! Both support non-streaming and SSE-streaming generation. The active
//! provider is selected by configuration at construction time, never by
//! runtime string dispatch.
//!
//! [`MockLlm`] provides a scriptable in-process model for tests.

pub mod gemini;
pub mod huggingface;
pub mod mock;

pub use gemini::{GeminiConfig, GeminiModel};
pub use huggingface::{HuggingFaceConfig, HuggingFaceModel};
pub use mock::MockLlm;
