//! Session storage backends for Annai.
//!
//! Two implementations of `annai_core::SessionStore`:
//! - [`InMemorySessionStore`] — ephemeral, for the gateway's default mode
//!   and for tests.
//! - [`FileSessionStore`] — one JSON file per session, survives restarts.
//!
//! Both are last-writer-wins; see the trait docs for the concurrency
//! policy.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileSessionStore;
pub use in_memory::InMemorySessionStore;
