//! Main HTTP Gateway Server.
//!
//! Routing, shared state, and the listener loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

use llamachat_core::LlmProvider;

use crate::chat_api;
use crate::control_ui;
use crate::history::ConversationHistory;
use crate::status_api;

/// Parameters applied to every completion request.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".into(),
            system_prompt: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn LlmProvider>,
    pub settings: Arc<CompletionSettings>,
    pub history: ConversationHistory,
    /// Tags chat event records for this gateway run.
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub static_dir: Option<PathBuf>,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: CompletionSettings) -> Self {
        Self {
            provider,
            settings: Arc::new(settings),
            history: ConversationHistory::new(),
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            static_dir: None,
        }
    }

    /// Serves the web front-end from `dir` for every non-API path.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}

/// Builds the gateway router. CORS is open on the API routes only.
pub fn router(state: GatewayState) -> Router {
    let api = Router::new()
        .route("/api/status", get(status_api::status))
        .route("/api/chat", post(chat_api::chat))
        .route("/api/clear", post(chat_api::clear))
        .layer(CorsLayer::permissive());

    let app = match &state.static_dir {
        Some(dir) => api.fallback_service(control_ui::ui_service(dir)),
        None => api,
    };
    app.with_state(state)
}

/// Serves the gateway on an already-bound listener until it fails.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<()> {
    let app = router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds `addr` and runs the gateway until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        provider = state.provider.name(),
        model = %state.settings.model,
        "Gateway HTTP server listening on {}", addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use llamachat_providers::MockProvider;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(provider: MockProvider) -> GatewayState {
        GatewayState::new(Arc::new(provider), CompletionSettings::default())
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(raw) => {
                builder = builder.header("content-type", "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    async fn call_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let raw = body.map(|v| v.to_string());
        let (status, bytes) = call(app, method, uri, raw.as_deref()).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_lists_endpoints() {
        let app = router(state(MockProvider::new("mock")));
        let (status, body) = call_json(&app, "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "🦙 Llama AI Chatbot API Running");
        assert_eq!(body["endpoints"]["chat"], "/api/chat");
        assert_eq!(body["endpoints"]["clear"], "/api/clear");
        assert_eq!(body["provider"], "mock");
    }

    #[tokio::test]
    async fn test_chat_success_records_history() {
        let gateway = state(MockProvider::new("mock").with_response("**Hi** there"));
        let history = gateway.history.clone();
        let app = router(gateway);

        let (status, body) =
            call_json(&app, "POST", "/api/chat", Some(json!({"message": "Hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "response": "**Hi** there"}));
        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn test_chat_sends_full_history() {
        let app = router(state(MockProvider::new("mock")));
        call_json(&app, "POST", "/api/chat", Some(json!({"message": "one"}))).await;
        let (_, body) =
            call_json(&app, "POST", "/api/chat", Some(json!({"message": "two"}))).await;
        assert_eq!(body["response"], "Mock response to 3 message(s)");
    }

    #[tokio::test]
    async fn test_chat_without_message_is_bad_request() {
        let app = router(state(MockProvider::new("mock")));
        for payload in [json!({}), json!({"message": ""}), json!({"message": null})] {
            let (status, body) = call_json(&app, "POST", "/api/chat", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "No message provided"}));
        }

        let (status, _) = call(&app, "POST", "/api/chat", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_and_drops_turn() {
        let gateway = state(MockProvider::new("mock").failing("upstream down"));
        let history = gateway.history.clone();
        let app = router(gateway);

        let (status, body) =
            call_json(&app, "POST", "/api/chat", Some(json!({"message": "Hello"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"status": "error", "error": "upstream down"}));
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_resets_history() {
        let gateway = state(MockProvider::new("mock"));
        let history = gateway.history.clone();
        let app = router(gateway);
        call_json(&app, "POST", "/api/chat", Some(json!({"message": "Hello"}))).await;

        let (status, body) = call_json(&app, "POST", "/api/clear", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "cleared"}));
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_static_front_end_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Llama</h1>").unwrap();
        let app = router(state(MockProvider::new("mock")).with_static_dir(dir.path()));

        let (status, body) = call(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"<h1>Llama</h1>");

        let (status, _) = call(&app, "GET", "/missing.css", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_without_front_end_is_404() {
        let app = router(state(MockProvider::new("mock")));
        let (status, _) = call(&app, "GET", "/index.html", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
