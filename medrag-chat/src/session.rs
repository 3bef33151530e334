//! In-memory chat sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use medrag_core::Turn;

/// Where a session is in the answering pipeline.
///
/// `Failed` means the last question did not complete; the session stays
/// usable and the next question resets the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Rewriting,
    Retrieving,
    Generating,
    Failed,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) turns: Vec<Turn>,
    pub(crate) phase: Phase,
}

/// One conversation: an ordered, append-only turn sequence.
///
/// History lives only in memory and is gone when the session is
/// dropped. The state sits behind an async mutex so at most one
/// question is in flight per session; independent sessions never
/// contend.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Snapshot of the recorded turns. Waits for any in-flight question
    /// to settle first.
    pub async fn history(&self) -> Vec<Turn> {
        self.state.lock().await.turns.clone()
    }

    /// Drop all recorded turns. The session itself stays usable.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.turns.clear();
        state.phase = Phase::Idle;
    }

    /// Acquire the session for one question. The guard owns the lock,
    /// so it can be moved into a streaming reply and released on drop.
    pub(crate) async fn acquire(&self) -> OwnedMutexGuard<SessionState> {
        Arc::clone(&self.state).lock_owned().await
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clear_empties_history() {
        let session = Session::new();
        session.acquire().await.turns.push(Turn::user("hello"));
        assert_eq!(session.history().await.len(), 1);

        session.clear().await;
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let a = Session::new();
        let b = Session::new();
        a.acquire().await.turns.push(Turn::user("only in a"));

        assert_eq!(a.history().await.len(), 1);
        assert!(b.history().await.is_empty());
        assert_ne!(a.id(), b.id());
    }
}
