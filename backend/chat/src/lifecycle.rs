//! Message lifecycle state machine.
//!
//! ```text
//! Pending ──response──▶ Streaming ──reveal done──▶ Settled
//!    │
//!    └──failure──▶ Failed
//! ```

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Request in flight.
    Pending,
    /// Response received, reveal in progress.
    Streaming,
    /// Reveal complete.
    Settled,
    /// Transport or protocol failure; an error message was rendered.
    Failed,
}

impl MessageState {
    /// Whether a new outgoing message may be sent after this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageState::Settled | MessageState::Failed)
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageState::Pending => "pending",
            MessageState::Streaming => "streaming",
            MessageState::Settled => "settled",
            MessageState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    ResponseReceived,
    RequestFailed,
    RevealFinished,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid transition from {from} on {event:?}")]
pub struct LifecycleError {
    pub from: MessageState,
    pub event: LifecycleEvent,
}

/// Lifecycle of a single outgoing message. Starts in `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    state: MessageState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: MessageState::Pending,
        }
    }

    pub fn state(&self) -> MessageState {
        self.state
    }

    pub fn apply(&mut self, event: LifecycleEvent) -> Result<MessageState, LifecycleError> {
        let next = match (self.state, event) {
            (MessageState::Pending, LifecycleEvent::ResponseReceived) => MessageState::Streaming,
            (MessageState::Pending, LifecycleEvent::RequestFailed) => MessageState::Failed,
            (MessageState::Streaming, LifecycleEvent::RevealFinished) => MessageState::Settled,
            (from, event) => return Err(LifecycleError { from, event }),
        };
        self.state = next;
        Ok(next)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.apply(LifecycleEvent::ResponseReceived), Ok(MessageState::Streaming));
        assert!(!lc.state().is_terminal());
        assert_eq!(lc.apply(LifecycleEvent::RevealFinished), Ok(MessageState::Settled));
        assert!(lc.state().is_terminal());
    }

    #[test]
    fn test_failure_only_from_pending() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.apply(LifecycleEvent::RequestFailed), Ok(MessageState::Failed));

        let mut lc = Lifecycle::new();
        lc.apply(LifecycleEvent::ResponseReceived).unwrap();
        let err = lc.apply(LifecycleEvent::RequestFailed).unwrap_err();
        assert_eq!(err.from, MessageState::Streaming);
        assert_eq!(lc.state(), MessageState::Streaming);
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let mut lc = Lifecycle::new();
        lc.apply(LifecycleEvent::RequestFailed).unwrap();
        assert!(lc.apply(LifecycleEvent::ResponseReceived).is_err());
        assert!(lc.apply(LifecycleEvent::RevealFinished).is_err());
        assert_eq!(
            Lifecycle::new().apply(LifecycleEvent::RevealFinished).unwrap_err().to_string(),
            "invalid transition from pending on RevealFinished"
        );
    }
}
