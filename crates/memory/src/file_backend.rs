//! File-based session store — one JSON file per session.
//!
//! Storage location: `<base_dir>/<session_id>.json`, each file holding the
//! serialized message history. Simple, portable, human-inspectable, and
//! requires no external services.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use annai_core::error::SessionError;
use annai_core::message::Message;
use annai_core::session::{SessionId, SessionStore};

/// A file-backed session store.
///
/// Writes go straight to disk on every `put`, so histories survive
/// restarts. Like the in-memory store, concurrent requests on the same
/// session id are last-writer-wins.
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created on first write if it does not exist.
    pub fn new(base_dir: PathBuf) -> Self {
        debug!(dir = %base_dir.display(), "File session store");
        Self { base_dir }
    }

    /// Session ids come from URLs and user input; keep only filename-safe
    /// characters so an id can never escape the base directory.
    fn sanitize(id: &SessionId) -> Result<String, SessionError> {
        let safe: String = id
            .0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if safe.is_empty() {
            return Err(SessionError::InvalidId(id.0.clone()));
        }
        Ok(safe)
    }

    fn path_for(&self, id: &SessionId) -> Result<PathBuf, SessionError> {
        Ok(self.base_dir.join(format!("{}.json", Self::sanitize(id)?)))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, id: &SessionId) -> Result<Vec<Message>, SessionError> {
        let path = self.path_for(id)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()), // no file yet — new session
        };

        match serde_json::from_str(&content) {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!(session = %id, error = %e, "Corrupted session file, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    async fn put(&self, id: &SessionId, history: Vec<Message>) -> Result<(), SessionError> {
        let path = self.path_for(id)?;

        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SessionError::Storage(format!("Failed to create session dir: {e}")))?;

        let content = serde_json::to_string_pretty(&history)
            .map_err(|e| SessionError::Storage(format!("Failed to serialize history: {e}")))?;

        std::fs::write(&path, content)
            .map_err(|e| SessionError::Storage(format!("Failed to write session file: {e}")))?;

        Ok(())
    }
}
