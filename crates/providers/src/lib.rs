//! LLM provider implementations for Annai.
//!
//! The pipeline only needs one provider: an OpenAI-compatible
//! chat-completions endpoint. Construction happens here so the binaries
//! never touch wire details.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;

use annai_config::AppConfig;
use annai_core::provider::Provider;

/// Build the configured provider.
///
/// Returns `None` when no API key is available — callers decide whether
/// that is fatal (the CLI prints setup instructions, the gateway refuses
/// to start).
pub fn from_config(config: &AppConfig) -> Option<Arc<dyn Provider>> {
    let api_key = config.api_key.clone()?;
    Some(Arc::new(OpenAiCompatProvider::new(
        "openai",
        config.base_url.clone(),
        api_key,
    )))
}
