//! Composes rewrite → retrieve → generate for one session.

use async_stream::try_stream;
use futures::StreamExt;
use tracing::{debug, info};

use medrag_core::Turn;
use medrag_rag::{Provenance, Retriever, SearchResult};

use crate::answer::{AnswerGenerator, AnswerStream};
use crate::error::{ChatError, Result};
use crate::rewrite::QueryRewriter;
use crate::session::{Phase, Session};

/// A completed answer with its source citations.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub answer: String,
    /// Deduplicated (source, page) provenance of the retrieved context,
    /// in retrieval order.
    pub citations: Vec<Provenance>,
}

/// A streaming answer. Citations are known up front (retrieval happens
/// before generation starts); the stream holds the session lock and
/// releases it when drained or dropped.
pub struct StreamingReply {
    pub citations: Vec<Provenance>,
    pub stream: AnswerStream,
}

/// Drives one question through the full pipeline.
///
/// For each question: the user turn is appended first, the rewriter
/// sees only the *prior* history, retrieval uses the rewritten query,
/// and the generator sees the original question plus the prior history.
/// The assistant turn is appended only on success, so a failed turn
/// never leaves partial output in the history.
pub struct ChatOrchestrator {
    rewriter: QueryRewriter,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl ChatOrchestrator {
    pub fn new(rewriter: QueryRewriter, retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self { rewriter, retriever, generator }
    }

    /// Answer a question, blocking the session until the reply is
    /// complete.
    pub async fn ask(&self, session: &Session, question: &str) -> Result<ChatReply> {
        let question = validated(question)?;
        let mut guard = session.acquire().await;
        let prior = guard.turns.clone();
        guard.turns.push(Turn::user(question));

        guard.phase = Phase::Rewriting;
        let rewritten = match self.rewriter.rewrite(&prior, question).await {
            Ok(q) => q,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e);
            }
        };

        guard.phase = Phase::Retrieving;
        let results = match self.retriever.retrieve(&rewritten).await {
            Ok(r) => r,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e.into());
            }
        };
        let citations = dedupe_citations(&results);
        debug!(session = %session.id(), results = results.len(), "context retrieved");

        guard.phase = Phase::Generating;
        let answer = match self.generator.answer(question, &prior, &results).await {
            Ok(a) => a,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e);
            }
        };

        guard.turns.push(Turn::assistant(answer.clone()));
        guard.phase = Phase::Idle;
        info!(session = %session.id(), turns = guard.turns.len(), "question answered");
        Ok(ChatReply { answer, citations })
    }

    /// Answer a question as a fragment stream.
    ///
    /// The returned stream owns the session lock: the assistant turn is
    /// appended when the stream completes, and dropping the stream
    /// cancels generation, releases the lock, and leaves only the user
    /// turn in the history.
    pub async fn ask_stream(&self, session: &Session, question: &str) -> Result<StreamingReply> {
        let question = validated(question)?;
        let mut guard = session.acquire().await;
        let prior = guard.turns.clone();
        guard.turns.push(Turn::user(question));

        guard.phase = Phase::Rewriting;
        let rewritten = match self.rewriter.rewrite(&prior, question).await {
            Ok(q) => q,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e);
            }
        };

        guard.phase = Phase::Retrieving;
        let results = match self.retriever.retrieve(&rewritten).await {
            Ok(r) => r,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e.into());
            }
        };
        let citations = dedupe_citations(&results);

        guard.phase = Phase::Generating;
        let mut inner = match self.generator.answer_stream(question, &prior, &results).await {
            Ok(s) => s,
            Err(e) => {
                guard.phase = Phase::Failed;
                return Err(e);
            }
        };

        let stream = try_stream! {
            let mut guard = guard;
            let mut answer = String::new();
            while let Some(fragment) = inner.next().await {
                match fragment {
                    Ok(text) => {
                        answer.push_str(&text);
                        yield text;
                    }
                    Err(e) => {
                        guard.phase = Phase::Failed;
                        Err(e)?;
                    }
                }
            }
            guard.turns.push(Turn::assistant(answer));
            guard.phase = Phase::Idle;
        };

        Ok(StreamingReply { citations, stream: Box::pin(stream) })
    }
}

fn validated(question: &str) -> Result<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(ChatError::InvalidInput("question is empty".into()));
    }
    Ok(trimmed)
}

/// Collapse retrieval results to unique (source, page) pairs, keeping
/// retrieval order.
fn dedupe_citations(results: &[SearchResult]) -> Vec<Provenance> {
    let mut citations: Vec<Provenance> = Vec::new();
    for result in results {
        let provenance = result.chunk.provenance();
        if !citations.contains(&provenance) {
            citations.push(provenance);
        }
    }
    citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_rag::Chunk;

    fn scored(source: &str, page: usize) -> SearchResult {
        SearchResult { chunk: Chunk::new("text", source, page), score: 0.5 }
    }

    #[test]
    fn citations_deduplicate_and_keep_order() {
        let results =
            vec![scored("b.pdf", 1), scored("a.pdf", 0), scored("b.pdf", 1), scored("b.pdf", 2)];
        let citations = dedupe_citations(&results);

        assert_eq!(
            citations,
            vec![
                Provenance { source: "b.pdf".into(), page: 1 },
                Provenance { source: "a.pdf".into(), page: 0 },
                Provenance { source: "b.pdf".into(), page: 2 },
            ]
        );
    }

    #[test]
    fn blank_questions_are_rejected() {
        assert!(matches!(validated("   \n"), Err(ChatError::InvalidInput(_))));
        assert_eq!(validated("  what is aspirin?  ").unwrap(), "what is aspirin?");
    }
}
