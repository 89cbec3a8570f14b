//! HTTP API gateway for Annai.
//!
//! Exposes the assistant over REST: a health check and a chat endpoint.
//! The gateway owns session-id generation and HTTP framing; everything
//! else is delegated to the agent pipeline.
//!
//! Built on Axum.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use annai_agent::Pipeline;
use annai_config::AppConfig;
use annai_core::session::SessionId;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Pipeline,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, config: &AppConfig) -> Router {
    let cors = build_cors(config);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: only the origins named in config, or same-origin when none
/// are configured.
fn build_cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = config
        .gateway
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = annai_providers::from_config(&config)
        .ok_or("No API key configured — set OPENAI_API_KEY or run `annai onboard`")?;
    let tools = Arc::new(annai_tools::default_registry(&config));
    let store = Arc::new(annai_memory::InMemorySessionStore::new());
    let pipeline = Pipeline::new(provider, tools, store, &config);

    let state = Arc::new(GatewayState { pipeline });
    let router = build_router(state, &config);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "annai",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ChatReply {
    response: String,
    session_id: String,
    intent: String,
}

#[derive(Serialize)]
struct ErrorReply {
    error: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorReply>)> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorReply {
                error: "message must not be empty".into(),
            }),
        ));
    }

    // Missing session id means a new session.
    let session_id = body
        .session_id
        .map(|s| SessionId::from(&s))
        .unwrap_or_default();

    match state.pipeline.handle(&session_id, message).await {
        Ok(outcome) => Ok(Json(ChatReply {
            response: outcome.response,
            session_id: session_id.to_string(),
            intent: outcome.intent,
        })),
        Err(e) => {
            // Raw error detail stays in the logs, never in the reply.
            error!(session = %session_id, error = %e, "Chat request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorReply {
                    error: "The assistant is temporarily unavailable. Please try again.".into(),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annai_core::error::ProviderError;
    use annai_core::message::Message;
    use annai_core::provider::{ChatRequest, ChatResponse, Provider};
    use annai_core::tool::ToolRegistry;
    use annai_memory::InMemorySessionStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct ScriptedProvider {
        script: Mutex<Vec<Result<ChatResponse, ProviderError>>>,
    }

    impl ScriptedProvider {
        fn new(mut script: Vec<Result<ChatResponse, ProviderError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }

        fn text(content: &str) -> Result<ChatResponse, ProviderError> {
            Ok(ChatResponse {
                message: Message::assistant(content),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".into())))
        }
    }

    fn test_router(script: Vec<Result<ChatResponse, ProviderError>>) -> Router {
        let config = AppConfig::default();
        let pipeline = Pipeline::new(
            Arc::new(ScriptedProvider::new(script)),
            Arc::new(ToolRegistry::new()),
            Arc::new(InMemorySessionStore::new()),
            &config,
        );
        build_router(Arc::new(GatewayState { pipeline }), &config)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let router = test_router(vec![]);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "annai");
    }

    #[tokio::test]
    async fn chat_generates_a_session_id_when_missing() {
        let router = test_router(vec![
            ScriptedProvider::text("small_talk"),
            ScriptedProvider::text("Hello!"),
        ]);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "Hi there"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["response"], "Hello!");
        assert_eq!(json["intent"], "small_talk");
        assert!(!json["session_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let router = test_router(vec![]);
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pipeline_failure_hides_error_detail() {
        let router = test_router(vec![Err(ProviderError::AuthenticationFailed(
            "bad key sk-secret".into(),
        ))]);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "Hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        let error = json["error"].as_str().unwrap();
        assert!(!error.contains("sk-secret"));
        assert!(error.contains("temporarily unavailable"));
    }
}
