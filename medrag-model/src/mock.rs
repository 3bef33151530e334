//! Scriptable in-process LLM for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_stream::try_stream;
use async_trait::async_trait;

use medrag_core::{Llm, LlmRequest, Result, TextStream};

/// A mock [`Llm`] that replays scripted responses.
///
/// Responses are served from a queue; when the queue is empty the
/// fallback response is used. Every request is recorded for later
/// inspection, and streamed fragments are counted so tests can assert
/// that an abandoned stream stops producing.
pub struct MockLlm {
    fallback: String,
    queued: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
    emitted: Arc<AtomicUsize>,
}

impl MockLlm {
    /// Create a mock that answers every request with `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            emitted: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a response to be served before the fallback.
    pub fn enqueue(&self, response: impl Into<String>) {
        self.queued.lock().unwrap().push_back(response.into());
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Total number of fragments emitted across all streams.
    pub fn fragments_emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> String {
        self.queued.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_stream(&self, request: LlmRequest) -> Result<TextStream> {
        self.requests.lock().unwrap().push(request);
        let response = self.next_response();
        let emitted = Arc::clone(&self.emitted);

        // Split after each space so fragments concatenate losslessly.
        let fragments: Vec<String> =
            response.split_inclusive(' ').map(str::to_string).collect();

        let stream = try_stream! {
            for fragment in fragments {
                emitted.fetch_add(1, Ordering::SeqCst);
                yield fragment;
            }
        };
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn replays_queue_then_fallback() {
        let llm = MockLlm::new("fallback");
        llm.enqueue("first");

        assert_eq!(llm.generate(LlmRequest::default()).await.unwrap(), "first");
        assert_eq!(llm.generate(LlmRequest::default()).await.unwrap(), "fallback");
        assert_eq!(llm.request_count(), 2);
    }

    #[tokio::test]
    async fn abandoned_stream_stops_producing() {
        let llm = MockLlm::new("one two three four");
        let mut stream = llm.generate_stream(LlmRequest::default()).await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "one ");
        drop(stream);

        assert_eq!(llm.fragments_emitted(), 1);
    }
}
