//! # medrag-core
//!
//! Shared abstractions for the MedRAG assistant: the [`Llm`] trait that
//! both hosted model providers implement, the request/response types
//! that flow through it, and the chat [`Turn`]/[`Role`] types used by
//! session history.
//!
//! Provider implementations live in `medrag-model`; this crate only
//! defines the seam between them and the conversational pipeline.

mod content;
mod error;
mod llm;

pub use content::{Role, Turn};
pub use error::{CoreError, Result};
pub use llm::{GenerationConfig, Llm, LlmRequest, TextStream};
