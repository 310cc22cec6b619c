//! Chat transport: how a session reaches the gateway.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use llamachat_core::{ChatError, ChatReply, ChatRequest};

/// Request/response exchange with the chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one user message and returns the complete reply text.
    async fn send(&self, message: &str) -> Result<String, ChatError>;

    /// Asks the backend to forget the conversation.
    async fn clear(&self) -> Result<(), ChatError>;
}

/// JSON-over-HTTP transport against the gateway's `/api` routes.
pub struct HttpTransport {
    client: Client,
    api_url: String,
}

impl HttpTransport {
    /// `api_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&ChatRequest::new(message))
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, "Chat response received");
        if !status.is_success() {
            return Err(ChatError::Transport(format!("HTTP error! status: {status}")));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| ChatError::Protocol(format!("malformed reply: {e}")))?;
        reply.into_text()
    }

    async fn clear(&self) -> Result<(), ChatError> {
        let response = self
            .client
            .post(self.endpoint("clear"))
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ChatError::Transport(format!(
                "HTTP error! status: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use llamachat_gateway::{CompletionSettings, GatewayState};
    use llamachat_providers::MockProvider;
    use tokio::net::TcpListener;

    async fn spawn_gateway(provider: MockProvider) -> (String, GatewayState) {
        let state = GatewayState::new(Arc::new(provider), CompletionSettings::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(llamachat_gateway::serve(listener, state.clone()));
        (format!("http://{addr}/api"), state)
    }

    #[tokio::test]
    async fn test_send_and_clear_against_gateway() {
        let (url, state) = spawn_gateway(MockProvider::new("mock").with_response("**Hi**")).await;
        let transport = HttpTransport::new(format!("{url}/"));
        assert_eq!(transport.api_url(), url);

        assert_eq!(transport.send("Hello").await.unwrap(), "**Hi**");
        assert_eq!(state.history.len().await, 2);

        transport.clear().await.unwrap();
        assert!(state.history.is_empty().await);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let (url, _) = spawn_gateway(MockProvider::new("mock").failing("boom")).await;
        let err = HttpTransport::new(url).send("Hello").await.unwrap_err();
        assert!(matches!(&err, ChatError::Transport(msg) if msg.contains("500")), "{err}");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(format!("http://{addr}/api"));
        assert!(matches!(
            transport.send("Hello").await,
            Err(ChatError::Transport(_))
        ));
        assert!(matches!(transport.clear().await, Err(ChatError::Transport(_))));
    }

    #[tokio::test]
    async fn test_success_status_with_bad_payload_is_protocol_error() {
        use axum::{routing::post, Json, Router};
        use serde_json::json;

        let app = Router::new()
            .route("/api/chat", post(|| async { Json(json!({"response": "hi"})) }))
            .route(
                "/api/other/chat",
                post(|| async { Json(json!({"status": "error", "error": "quota"})) }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let err = HttpTransport::new(format!("http://{addr}/api"))
            .send("Hello")
            .await
            .unwrap_err();
        assert!(matches!(&err, ChatError::Protocol(msg) if msg == "Unknown error"));

        let err = HttpTransport::new(format!("http://{addr}/api/other"))
            .send("Hello")
            .await
            .unwrap_err();
        assert!(matches!(&err, ChatError::Protocol(msg) if msg == "quota"));
    }
}
