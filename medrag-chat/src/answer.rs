//! Grounded answer generation.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};

use medrag_core::{GenerationConfig, Llm, LlmRequest, Turn};
use medrag_rag::SearchResult;

use crate::error::{ChatError, Result};

/// The assistant's standing instructions. Guardrails: context-only
/// answers with a fixed phrase when the context has nothing, no
/// diagnoses or treatment advice, plain-language explanations, and
/// bullet lists for enumerable content.
pub const SYSTEM_PROMPT: &str = "You are an advanced medical assistant designed to help \
users understand complex medical documents. Use the following pieces of retrieved context \
to answer the user's question. \n\n\
**Guidelines:**\n\
1. **Strict Context Adherence:** Answer ONLY based on the provided documents. If the \
answer is not in the context, say 'I cannot find this information in the documents.' Do \
not attempt to answer from outside knowledge.\n\
2. **Safety First:** Do not provide medical diagnoses or treatment recommendations. \
Always advise the user to consult a healthcare professional.\n\
3. **Clarity:** Explain medical jargon in simple terms if possible.\n\
4. **Format:** Use bullet points for lists (like symptoms or steps) to make the answer \
easy to read.";

/// What the model is instructed to say when the retrieved context does
/// not contain the answer.
pub const FALLBACK_PHRASE: &str = "I cannot find this information in the documents.";

/// A one-shot stream of answer fragments; concatenated they form the
/// full answer. Dropping it cancels generation.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Turns a question, conversation history, and retrieved passages into
/// a grounded answer.
pub struct AnswerGenerator {
    llm: Arc<dyn Llm>,
    config: GenerationConfig,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn Llm>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    /// Generate the complete answer text.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Generation`] when the LLM call fails.
    pub async fn answer(
        &self,
        question: &str,
        history: &[Turn],
        context: &[SearchResult],
    ) -> Result<String> {
        let request = self.build_request(question, history, context);
        self.llm
            .generate(request)
            .await
            .map_err(|e| ChatError::Generation { message: e.to_string() })
    }

    /// Generate the answer as a fragment stream. Fragment errors are
    /// surfaced as stream items, not swallowed.
    pub async fn answer_stream(
        &self,
        question: &str,
        history: &[Turn],
        context: &[SearchResult],
    ) -> Result<AnswerStream> {
        let request = self.build_request(question, history, context);
        let stream = self
            .llm
            .generate_stream(request)
            .await
            .map_err(|e| ChatError::Generation { message: e.to_string() })?;

        let mapped = stream.map(|fragment| {
            fragment.map_err(|e| ChatError::Generation { message: e.to_string() })
        });
        Ok(Box::pin(mapped))
    }

    /// Assemble the request: system prompt + retrieved context as the
    /// system instruction, then the history and the current question as
    /// alternating turns.
    fn build_request(
        &self,
        question: &str,
        history: &[Turn],
        context: &[SearchResult],
    ) -> LlmRequest {
        let passages: Vec<&str> = context.iter().map(|r| r.chunk.text.as_str()).collect();
        let instruction = format!("{SYSTEM_PROMPT}\n\nContext: {}", passages.join("\n\n"));

        let mut turns = history.to_vec();
        turns.push(Turn::user(question));

        LlmRequest::new(turns).with_system_instruction(instruction).with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_rag::Chunk;

    fn result(text: &str) -> SearchResult {
        SearchResult { chunk: Chunk::new(text, "doc.pdf", 0), score: 0.9 }
    }

    #[test]
    fn request_joins_context_with_blank_lines() {
        let generator = AnswerGenerator::new(
            Arc::new(medrag_model::MockLlm::new("")),
            GenerationConfig::default(),
        );
        let request = generator.build_request(
            "what is aspirin?",
            &[],
            &[result("first passage"), result("second passage")],
        );

        let instruction = request.system_instruction.unwrap();
        assert!(instruction.contains("Context: first passage\n\nsecond passage"));
        assert!(instruction.contains("Strict Context Adherence"));
        assert!(instruction.contains(FALLBACK_PHRASE));
    }

    #[test]
    fn request_puts_question_last() {
        let generator = AnswerGenerator::new(
            Arc::new(medrag_model::MockLlm::new("")),
            GenerationConfig::default(),
        );
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let request = generator.build_request("what is aspirin?", &history, &[]);

        assert_eq!(request.turns.len(), 3);
        assert_eq!(request.turns[2].text, "what is aspirin?");
        assert_eq!(request.config, Some(GenerationConfig::default()));
    }
}
