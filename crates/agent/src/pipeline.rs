//! The linear three-stage pipeline and its session round-trip.
//!
//! `classify_intent → respond → update_memory`, in that order, every time.
//! The shape is deliberately branch-free: the stages exist to fix an
//! evaluation order with data dependencies (intent before tool dispatch,
//! final response before the memory update), not to express business
//! logic.

use std::sync::Arc;
use tracing::{debug, info};

use annai_config::AppConfig;
use annai_core::error::Error;
use annai_core::provider::Provider;
use annai_core::session::{SessionId, SessionStore};
use annai_core::tool::ToolRegistry;

use crate::intent::IntentClassifier;
use crate::memory::MemoryManager;
use crate::responder::Responder;
use crate::state::ConversationState;

/// What a request hands back to the gateway or CLI.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The assistant's answer (possibly a fallback string, never empty for
    /// non-empty input).
    pub response: String,

    /// The classified intent, surfaced for observability.
    pub intent: String,
}

/// The assembled agent pipeline.
pub struct Pipeline {
    classifier: IntentClassifier,
    responder: Responder,
    memory: MemoryManager,
    store: Arc<dyn SessionStore>,
}

impl Pipeline {
    /// Wire the three stages from configuration and shared collaborators.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        config: &AppConfig,
    ) -> Self {
        let model = config.default_model.clone();
        Self {
            classifier: IntentClassifier::new(provider.clone(), &model),
            responder: Responder::new(provider.clone(), tools, &model)
                .with_max_tokens(config.default_max_tokens),
            memory: MemoryManager::new(
                provider,
                &model,
                config.memory.max_history_tokens,
                config.memory.truncate_keep_last,
            ),
            store,
        }
    }

    /// Handle one request end to end: read the session, run the stages,
    /// persist the updated history.
    ///
    /// The store is touched exactly twice, with no lock held across the
    /// model calls in between — concurrent requests on the same session id
    /// are last-writer-wins (see `SessionStore`).
    pub async fn handle(
        &self,
        session_id: &SessionId,
        user_input: &str,
    ) -> Result<PipelineOutcome, Error> {
        let history = self.store.get(session_id).await?;
        debug!(session = %session_id, messages = history.len(), "Session loaded");

        let state = self.run(ConversationState::new(user_input, history)).await?;

        self.store.put(session_id, state.history).await?;

        info!(session = %session_id, intent = %state.intent, "Turn completed");
        Ok(PipelineOutcome {
            response: state.final_response,
            intent: state.intent,
        })
    }

    /// Run the three stages on an owned state.
    ///
    /// Classification is the only stage whose failure propagates; the
    /// responder and memory manager degrade internally.
    pub async fn run(&self, mut state: ConversationState) -> Result<ConversationState, Error> {
        state.intent = self.classifier.classify(&state.user_input).await?;
        self.responder.respond(&mut state).await;
        self.memory.update(&mut state).await;
        Ok(state)
    }
}
