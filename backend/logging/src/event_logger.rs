//! Chat Event Logger
//!
//! Structured chat events (user message, assistant reply, error, clear)
//! written through `tracing` under the `chat_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

/// Longest message excerpt kept in an event record.
const MAX_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    UserMessage { content: String },
    AssistantReply { content: String, tokens_used: u64, latency_ms: u64 },
    Error { error_msg: String },
    Cleared { turns_dropped: usize },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ChatEvent,
}

pub struct ChatEventLogger;

impl ChatEventLogger {
    /// Redacts and truncates the event's text, then emits it.
    pub fn log_event(session_id: &str, event: ChatEvent) -> EventLogEntry {
        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event: Self::scrub(event),
        };
        info!(target: "chat_events", event = ?entry, "Chat event");
        entry
    }

    fn scrub(mut event: ChatEvent) -> ChatEvent {
        match &mut event {
            ChatEvent::UserMessage { content } | ChatEvent::AssistantReply { content, .. } => {
                *content = excerpt(&redact_sensitive_data(content));
            }
            ChatEvent::Error { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            ChatEvent::Cleared { .. } => {}
        }
        event
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
