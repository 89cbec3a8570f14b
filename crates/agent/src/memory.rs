//! Memory consolidation — stage three of the pipeline.
//!
//! Appends the turn to the history, then enforces the token budget. The
//! budget policy is a full reset, not incremental compaction: once the
//! threshold is crossed, the entire history is replaced with a single
//! summary message. A session that triggers this repeatedly converges to
//! "one summary plus a few recent turns" and never grows unbounded.
//!
//! Budget failures never reach the user: if summarization itself fails,
//! the history is truncated to its most recent messages instead.

use std::sync::Arc;
use tracing::{info, warn};

use annai_core::error::ProviderError;
use annai_core::message::Message;
use annai_core::provider::{ChatRequest, Provider};

use crate::state::ConversationState;
use crate::token::history_tokens;

/// Prefix of the synthetic system message that replaces a summarized
/// history.
pub const SUMMARY_PREFIX: &str = "Previous conversation summary:";

/// Finalizes the conversation history and enforces the token budget.
pub struct MemoryManager {
    provider: Arc<dyn Provider>,
    model: String,
    max_history_tokens: usize,
    truncate_keep_last: usize,
}

impl MemoryManager {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        max_history_tokens: usize,
        truncate_keep_last: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_history_tokens,
            truncate_keep_last,
        }
    }

    /// Append the turn and, when over budget, summarize or truncate.
    ///
    /// Never fails — the degradation path is internal by design.
    pub async fn update(&self, state: &mut ConversationState) {
        state.history.push(Message::user(&state.user_input));
        state.history.push(Message::assistant(&state.final_response));

        let current_tokens = history_tokens(&state.history);
        if current_tokens <= self.max_history_tokens {
            return;
        }

        info!(
            current_tokens,
            limit = self.max_history_tokens,
            "Summarizing conversation: token budget exceeded"
        );

        match self.summarize(&state.history).await {
            Ok(summary) => {
                state.history = vec![Message::system(format!("{SUMMARY_PREFIX} {summary}"))];
                info!(
                    from = current_tokens,
                    to = history_tokens(&state.history),
                    "Conversation compressed"
                );
            }
            Err(e) => {
                warn!(error = %e, keep = self.truncate_keep_last, "Summarization failed, truncating history");
                let len = state.history.len();
                if len > self.truncate_keep_last {
                    state.history.drain(..len - self.truncate_keep_last);
                }
            }
        }
    }

    /// Ask the model for a concise summary of the whole history.
    async fn summarize(&self, history: &[Message]) -> Result<String, ProviderError> {
        let conversation_text = history
            .iter()
            .map(|m| m.render())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Summarize this conversation, keep it concise and to the point (essentials).\n\
             {conversation_text}\n\
             \n\
             Summary:"
        );

        let response = self
            .provider
            .complete(ChatRequest::plain(&self.model, vec![Message::user(prompt)]))
            .await?;

        Ok(response.message.content.trim().to_string())
    }
}
