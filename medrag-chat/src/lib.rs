//! Conversational pipeline for the MedRAG assistant.
//!
//! One question flows through three stages: [`QueryRewriter`] turns a
//! follow-up into a standalone query, [`medrag_rag::Retriever`] pulls
//! the top-k passages, and [`AnswerGenerator`] produces a grounded,
//! guardrailed answer. [`ChatOrchestrator`] composes the stages over a
//! [`Session`] and attaches source citations.

mod answer;
mod error;
mod orchestrator;
mod rewrite;
mod session;

pub use answer::{AnswerGenerator, AnswerStream, FALLBACK_PHRASE, SYSTEM_PROMPT};
pub use error::{ChatError, Result};
pub use orchestrator::{ChatOrchestrator, ChatReply, StreamingReply};
pub use rewrite::QueryRewriter;
pub use session::{Phase, Session};
