//! Chat endpoints (`/api/chat`, `/api/clear`).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use llamachat_core::{ChatError, ChatReply, ChatRequest, ClearReply, LlmRequest};
use logging::{ChatEvent, ChatEventLogger};

use crate::server::GatewayState;

/// Handler for `POST /api/chat`.
///
/// Sends the whole conversation plus the new message to the provider. The
/// exchange is only recorded once the completion succeeds.
pub async fn chat(
    State(state): State<GatewayState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let message = match payload {
        Ok(Json(request)) => request.message.filter(|m| !m.is_empty()),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected chat payload");
            None
        }
    };
    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No message provided" })),
        )
            .into_response();
    };

    ChatEventLogger::log_event(
        &state.session_id,
        ChatEvent::UserMessage {
            content: message.clone(),
        },
    );

    let settings = &state.settings;
    let request = LlmRequest {
        model: settings.model.clone(),
        system_prompt: settings.system_prompt.clone(),
        messages: state.history.with_pending(&message).await,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };

    match state.provider.complete(&request).await {
        Ok(response) => {
            state
                .history
                .record_exchange(&message, &response.content)
                .await;
            ChatEventLogger::log_event(
                &state.session_id,
                ChatEvent::AssistantReply {
                    content: response.content.clone(),
                    tokens_used: response.tokens_used,
                    latency_ms: response.latency_ms,
                },
            );
            Json(ChatReply::success(response.content)).into_response()
        }
        Err(e) => {
            let detail = format!("{e:#}");
            let err = ChatError::Provider {
                provider: state.provider.name().to_string(),
                message: detail.clone(),
            };
            error!(error = %err, "Completion failed");
            ChatEventLogger::log_event(
                &state.session_id,
                ChatEvent::Error {
                    error_msg: detail.clone(),
                },
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply::failure(detail)),
            )
                .into_response()
        }
    }
}

/// Handler for `POST /api/clear`.
pub async fn clear(State(state): State<GatewayState>) -> Json<ClearReply> {
    let turns_dropped = state.history.clear().await;
    ChatEventLogger::log_event(&state.session_id, ChatEvent::Cleared { turns_dropped });
    Json(ClearReply::cleared())
}
