//! Intent classification — stage one of the pipeline.
//!
//! A single model call with no prior context maps the raw user text to one
//! of four labels. The result is taken verbatim (trimmed): an unrecognized
//! label is not an error, it just selects no hint in the responder, so
//! misclassification degrades tool-selection guidance without ever
//! crashing the pipeline.

use std::sync::Arc;
use tracing::debug;

use annai_core::error::ProviderError;
use annai_core::message::Message;
use annai_core::provider::{ChatRequest, Provider};

const CLASSIFICATION_PROMPT: &str = "\
You are an intent classifier for a Tokyo travel assistant.

Classify this user input into exactly ONE category:
- travel_info: asking about temples, shrines, views, neighborhoods, places to visit in Tokyo
- weather_info: asking about weather, forecast, temperature, rain in Tokyo
- mixed: asking about BOTH travel places AND weather (even if one is primary)
- small_talk: greetings, general conversation, unrelated topics

Respond with ONLY the category name (no explanation).";

/// Single-shot intent classifier.
pub struct IntentClassifier {
    provider: Arc<dyn Provider>,
    model: String,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Classify the user input.
    ///
    /// A provider failure propagates to the caller — this is the one stage
    /// with no fallback, and its error is the only one a caller ever sees.
    pub async fn classify(&self, user_input: &str) -> Result<String, ProviderError> {
        let messages = vec![
            Message::system(CLASSIFICATION_PROMPT),
            Message::user(user_input),
        ];

        let response = self
            .provider
            .complete(ChatRequest::plain(&self.model, messages))
            .await?;

        let intent = response.message.content.trim().to_string();
        debug!(intent = %intent, "Classified user input");
        Ok(intent)
    }
}

/// The tool-usage hint injected into the responder's system prompt for a
/// classified intent. Unmapped labels get no hint — a deliberate soft
/// fallback, not an error.
pub fn intent_hint(intent: &str) -> &'static str {
    match intent {
        "travel_info" => {
            "HINT: This appears to be a travel question - you'll likely need the search_tokyo_info tool."
        }
        "weather_info" => {
            "HINT: This appears to be a weather question - you'll likely need the get_weather_info tool."
        }
        "mixed" => {
            "HINT: This query involves both travel and weather - you'll likely need BOTH search_tokyo_info and get_weather_info tools."
        }
        "small_talk" => {
            "HINT: This appears to be casual conversation - you probably won't need any tools."
        }
        _ => "",
    }
}
