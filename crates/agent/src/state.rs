//! The unit of work for one request.

use annai_core::message::Message;

/// Conversation state threaded through the three pipeline stages by
/// exclusive ownership — no stage runs concurrently with another, so no
/// locking is needed.
///
/// Write discipline per request: `user_input` is immutable once set,
/// `intent` and `final_response` are each written once by their stage, and
/// `history` is append-only except for the memory manager's summarization
/// replace.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// The raw user text for this turn.
    pub user_input: String,

    /// Classification label. Open string: unrecognized labels are passed
    /// through and simply select no hint.
    pub intent: String,

    /// The conversation history, read from the session store at entry and
    /// persisted back at exit.
    pub history: Vec<Message>,

    /// The assistant's answer for this turn.
    pub final_response: String,
}

impl ConversationState {
    /// Initial state at request entry: intent and response still empty.
    pub fn new(user_input: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            user_input: user_input.into(),
            intent: String::new(),
            history,
            final_response: String::new(),
        }
    }
}
