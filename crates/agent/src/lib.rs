//! The Annai agent pipeline — the heart of the assistant.
//!
//! Each request flows through three stages in a fixed order:
//!
//! 1. **Intent classification** — one model call maps the raw user text to
//!    a label that later selects a tool-usage hint.
//! 2. **Tool-augmented response** — a bounded two-round protocol with the
//!    model and the tool registry produces the final answer.
//! 3. **Memory consolidation** — the turn is appended to the history and
//!    the token budget is enforced by summarization or truncation.
//!
//! The order is load-bearing: intent must precede tool dispatch, and the
//! final response must precede the memory update. There is no branching,
//! no retries between stages, and no cycles.

pub mod intent;
pub mod memory;
pub mod pipeline;
pub mod responder;
pub mod state;
pub mod token;

pub use intent::IntentClassifier;
pub use memory::{MemoryManager, SUMMARY_PREFIX};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use responder::{Responder, FALLBACK_RESPONSE};
pub use state::ConversationState;
