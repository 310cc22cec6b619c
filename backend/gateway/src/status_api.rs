//! Gateway Status API
//!
//! Service banner, version and endpoint map for `GET /api/status`.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

pub const BANNER: &str = "🦙 Llama AI Chatbot API Running";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
    pub provider: String,
    pub model: String,
    pub turns: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

/// Handler for `GET /api/status`
pub async fn status(State(state): State<GatewayState>) -> Json<StatusReport> {
    let endpoints = [
        ("chat", "/api/chat"),
        ("clear", "/api/clear"),
        ("status", "/api/status"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect();

    Json(StatusReport {
        status: BANNER.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        endpoints,
        provider: state.provider.name().to_string(),
        model: state.settings.model.clone(),
        turns: state.history.len().await,
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}
