//! Follow-up question rewriting.

use std::sync::Arc;

use tracing::debug;

use medrag_core::{Llm, LlmRequest, Turn};

use crate::error::{ChatError, Result};

const REWRITE_INSTRUCTION: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question \
which can be understood without the chat history. Do NOT answer the question, just \
reformulate it if needed and otherwise return it as is.";

/// Rewrites follow-up questions into standalone retrieval queries.
///
/// "What about the side effects?" is useless as a vector-store query;
/// the rewriter folds the conversation so far into it. With no history
/// there is nothing to fold in, so the question passes through
/// unchanged and no LLM call is made.
pub struct QueryRewriter {
    llm: Arc<dyn Llm>,
}

impl QueryRewriter {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    /// Rewrite `question` against `history`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Rewrite`] when the LLM call fails. There is
    /// no fallback to the raw question: a silently unrewritten
    /// follow-up would retrieve the wrong passages.
    pub async fn rewrite(&self, history: &[Turn], question: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let mut turns = history.to_vec();
        turns.push(Turn::user(question));
        let request = LlmRequest::new(turns).with_system_instruction(REWRITE_INSTRUCTION);

        let rewritten = self
            .llm
            .generate(request)
            .await
            .map_err(|e| ChatError::Rewrite { message: e.to_string() })?;
        let rewritten = rewritten.trim().to_string();
        debug!(original = question, rewritten = %rewritten, "rewrote follow-up question");
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_model::MockLlm;

    #[tokio::test]
    async fn empty_history_passes_question_through() {
        let llm = Arc::new(MockLlm::new("should never be called"));
        let rewriter = QueryRewriter::new(llm.clone());

        let out = rewriter.rewrite(&[], "what is aspirin?").await.unwrap();
        assert_eq!(out, "what is aspirin?");
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn history_triggers_llm_rewrite() {
        let llm = Arc::new(MockLlm::new(""));
        llm.enqueue("what are the side effects of aspirin?");
        let rewriter = QueryRewriter::new(llm.clone());

        let history = vec![
            Turn::user("tell me about aspirin"),
            Turn::assistant("Aspirin is a common analgesic."),
        ];
        let out = rewriter.rewrite(&history, "what about side effects?").await.unwrap();
        assert_eq!(out, "what are the side effects of aspirin?");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].turns.len(), 3);
        assert_eq!(requests[0].turns[2].text, "what about side effects?");
        assert!(requests[0].system_instruction.as_deref().unwrap().contains("Do NOT answer"));
    }
}
