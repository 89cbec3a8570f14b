//! In-memory session store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use annai_core::error::SessionError;
use annai_core::message::Message;
use annai_core::session::{SessionId, SessionStore};

/// An in-memory session store backed by a HashMap.
///
/// The lock is held only for the duration of a single `get` or `put`,
/// never across a request's model calls — two concurrent requests on the
/// same session id race and the later `put` wins.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions currently stored.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, id: &SessionId) -> Result<Vec<Message>, SessionError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, id: &SessionId, history: Vec<Message>) -> Result<(), SessionError> {
        self.sessions.write().await.insert(id.clone(), history);
        Ok(())
    }
}
