//! Session store — the mapping from session id to conversation history.
//!
//! A session spans multiple turns. The pipeline touches the store exactly
//! twice per request: a read at entry and a write at exit, with no lock
//! held across the intervening model and tool calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::message::Message;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage for conversation histories, keyed by session id.
///
/// At most one history exists per session id; an absent key means a new
/// session with an empty history.
///
/// Concurrency policy: implementations are not required to serialize
/// concurrent requests against the same session id. The shipped stores are
/// last-writer-wins — when two requests interleave on one session, the
/// later `put` overwrites the earlier one's history without merging. A
/// store that needs stronger guarantees (per-key locking, compare-and-swap)
/// can provide them behind this same trait.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// A human-readable name for this store (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Fetch the history for a session. Unknown ids yield an empty history.
    async fn get(&self, id: &SessionId) -> std::result::Result<Vec<Message>, SessionError>;

    /// Persist the full history for a session, replacing what was there.
    async fn put(
        &self,
        id: &SessionId,
        history: Vec<Message>,
    ) -> std::result::Result<(), SessionError>;
}
