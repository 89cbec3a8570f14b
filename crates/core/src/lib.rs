//! # Annai Core
//!
//! Domain types, traits, and error definitions for the Annai travel
//! assistant. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! Every external collaborator is a trait here: the LLM provider, the tool
//! capability set, and the session store. Implementations live in their
//! respective crates, which keeps the dependency graph pointing inward and
//! makes the agent pipeline testable with mocks.

pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SessionError, ToolError};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{ChatRequest, ChatResponse, Provider, ToolDefinition, Usage};
pub use session::{SessionId, SessionStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
