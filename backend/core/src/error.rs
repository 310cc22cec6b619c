use thiserror::Error;

/// Top-level error type for LlamaChat.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The server could not be reached, or answered with a non-success status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered successfully but the payload lacked the success
    /// indicator or the reply text.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("a message is already in flight")]
    Busy,

    #[error("LLM provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatError::Provider {
            provider: "groq".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "LLM provider error (groq): rate limited");
        assert_eq!(
            ChatError::Transport("refused".into()).to_string(),
            "transport error: refused"
        );
    }

    #[test]
    fn test_from_anyhow() {
        let err: ChatError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
