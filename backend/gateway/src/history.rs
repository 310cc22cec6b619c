//! Server-side conversation history.
//!
//! One conversation per gateway; every completion request carries the whole
//! history.

use std::sync::Arc;

use tokio::sync::RwLock;

use llamachat_core::ChatTurn;

#[derive(Clone, Default)]
pub struct ConversationHistory {
    turns: Arc<RwLock<Vec<ChatTurn>>>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The history plus a pending user turn, as sent to the provider.
    pub async fn with_pending(&self, user: &str) -> Vec<ChatTurn> {
        let r = self.turns.read().await;
        let mut turns = r.clone();
        turns.push(ChatTurn::user(user));
        turns
    }

    /// Commits a completed exchange. A failed completion never reaches
    /// here, so its user turn is dropped.
    pub async fn record_exchange(&self, user: &str, assistant: &str) {
        let mut w = self.turns.write().await;
        w.push(ChatTurn::user(user));
        w.push(ChatTurn::assistant(assistant));
    }

    /// Drops every turn and returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut w = self.turns.write().await;
        let dropped = w.len();
        w.clear();
        dropped
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamachat_core::Role;

    #[tokio::test]
    async fn test_pending_turn_not_recorded() {
        let history = ConversationHistory::new();
        history.record_exchange("hi", "hello").await;

        let request = history.with_pending("again").await;
        assert_eq!(request.len(), 3);
        assert_eq!(request[2].role, Role::User);
        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn test_clear_reports_dropped_turns() {
        let history = ConversationHistory::new();
        history.record_exchange("a", "b").await;
        assert_eq!(history.clear().await, 2);
        assert!(history.is_empty().await);
        assert_eq!(history.clear().await, 0);
    }
}
