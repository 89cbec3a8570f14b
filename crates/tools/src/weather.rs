//! Weather lookup tool.
//!
//! `get_weather_info` fetches a multi-day forecast from the OpenWeather
//! API and hands the raw JSON to the model to interpret.
//!
//! Failure contract: degrade, never fail. On any upstream problem (missing
//! key, network error, bad status) the tool returns a structured fallback
//! payload marked as degraded, so the model still sees a usable result.

use async_trait::async_trait;
use tracing::{debug, warn};

use annai_core::error::ToolError;
use annai_core::tool::{Tool, ToolResult};

/// A thin client for the OpenWeather forecast endpoint.
pub struct WeatherClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            api_key,
            client,
        }
    }

    /// Fetch the forecast for a city as raw JSON.
    pub async fn forecast(&self, city: &str) -> Result<serde_json::Value, ToolError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ToolError::ExecutionFailed {
                tool_name: "get_weather_info".into(),
                reason: "No OpenWeather API key configured".into(),
            }
        })?;

        debug!(city, "Fetching weather forecast");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key)])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "get_weather_info".into(),
                reason: format!("Request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "get_weather_info".into(),
                reason: format!("Weather API returned status {}", response.status()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "get_weather_info".into(),
                reason: format!("Invalid weather payload: {e}"),
            })
    }
}

/// The `get_weather_info` tool.
pub struct GetWeatherInfoTool {
    client: WeatherClient,
    default_location: String,
}

impl GetWeatherInfoTool {
    pub fn new(client: WeatherClient, default_location: impl Into<String>) -> Self {
        Self {
            client,
            default_location: default_location.into(),
        }
    }

    /// The degraded payload returned when the weather service is down.
    /// Mock data marked as a fallback — the model can still answer.
    fn fallback_payload(location: &str) -> serde_json::Value {
        serde_json::json!({
            "error": format!("Weather service temporarily unavailable for {location}"),
            "fallback": {
                "location": location,
                "current": { "temp": 295.15, "description": "partly cloudy" },
                "message": "Using fallback data"
            }
        })
    }
}

#[async_trait]
impl Tool for GetWeatherInfoTool {
    fn name(&self) -> &str {
        "get_weather_info"
    }

    fn description(&self) -> &str {
        "Get current weather and 5-day forecast for Tokyo. Returns multi-day forecast data including today, tomorrow, and up to 5 days ahead."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location to get weather for (defaults to Tokyo if not specified)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let location = arguments["location"]
            .as_str()
            .unwrap_or(&self.default_location)
            .to_string();

        let payload = match self.client.forecast(&location).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, location, "Weather lookup failed, returning fallback");
                Self::fallback_payload(&location)
            }
        };

        let output = serde_json::to_string_pretty(&payload).unwrap_or_default();

        Ok(ToolResult {
            call_id: String::new(),
            output,
        })
    }
}
