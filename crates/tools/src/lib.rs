//! Built-in tool implementations for Annai.
//!
//! The assistant has two capabilities:
//! - [`SearchTokyoInfoTool`] — keyword search over the travel knowledge
//!   base. Returns plain-text errors; the model treats them as no results.
//! - [`GetWeatherInfoTool`] — OpenWeather forecast lookup. Degrades to a
//!   structured fallback payload instead of failing.

pub mod search;
pub mod weather;

pub use search::{KnowledgeEntry, KnowledgeIndex, SearchTokyoInfoTool};
pub use weather::{GetWeatherInfoTool, WeatherClient};

use tracing::warn;

use annai_config::AppConfig;
use annai_core::tool::ToolRegistry;

/// Build the default tool registry from configuration.
pub fn default_registry(config: &AppConfig) -> ToolRegistry {
    let index = match &config.knowledge.path {
        Some(path) => match KnowledgeIndex::load(path) {
            Ok(index) => index,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load knowledge file, using builtin set");
                KnowledgeIndex::builtin()
            }
        },
        None => KnowledgeIndex::builtin(),
    };

    let weather_client = WeatherClient::new(
        config.weather.base_url.clone(),
        config.weather.api_key.clone(),
    );

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchTokyoInfoTool::new(
        index,
        config.knowledge.top_k,
    )));
    registry.register(Box::new(GetWeatherInfoTool::new(
        weather_client,
        config.weather.default_location.clone(),
    )));
    registry
}
