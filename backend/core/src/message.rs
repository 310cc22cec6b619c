use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Speaker of a conversation turn, as sent to the completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// `POST /api/chat` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// `POST /api/chat` response body.
///
/// Every field is optional on the wire so that malformed payloads surface as
/// protocol errors rather than decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReplyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            status: Some(ReplyStatus::Success),
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: Some(ReplyStatus::Error),
            response: None,
            error: Some(error.into()),
        }
    }

    /// Extracts the reply text, requiring the success indicator.
    pub fn into_text(self) -> Result<String, ChatError> {
        match (self.status, self.response) {
            (Some(ReplyStatus::Success), Some(text)) => Ok(text),
            (Some(ReplyStatus::Success), None) => {
                Err(ChatError::Protocol("reply text missing".into()))
            }
            _ => Err(ChatError::Protocol(
                self.error.unwrap_or_else(|| "Unknown error".into()),
            )),
        }
    }
}

/// `POST /api/clear` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearReply {
    pub status: String,
}

impl ClearReply {
    pub fn cleared() -> Self {
        Self {
            status: "cleared".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_reply_wire_format() {
        let json = serde_json::to_value(ChatReply::success("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "response": "hi"}));
    }

    #[test]
    fn test_into_text_requires_indicator() {
        let reply: ChatReply = serde_json::from_str(r#"{"response": "hi"}"#).unwrap();
        assert!(matches!(reply.into_text(), Err(ChatError::Protocol(_))));

        let reply: ChatReply = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(matches!(reply.into_text(), Err(ChatError::Protocol(_))));

        let reply: ChatReply =
            serde_json::from_str(r#"{"status": "error", "error": "quota"}"#).unwrap();
        match reply.into_text() {
            Err(ChatError::Protocol(detail)) => assert_eq!(detail, "quota"),
            other => panic!("unexpected: {other:?}"),
        }

        let reply: ChatReply =
            serde_json::from_str(r#"{"status": "success", "response": "ok"}"#).unwrap();
        assert_eq!(reply.into_text().unwrap(), "ok");
    }

    #[test]
    fn test_turn_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatTurn::user("q")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"q"}"#);
    }

    #[test]
    fn test_request_without_message() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());
    }
}
