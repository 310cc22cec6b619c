//! Chat session
//!
//! Owns the transcript mount, the lifecycle of the latest outgoing message
//! and the in-flight reveal. One message is in flight at a time.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use llamachat_core::ChatError;
use markdown::{normalize, Element, MessageKind, Mount, RevealHandle, Revealer, Tag};

use crate::lifecycle::{Lifecycle, LifecycleEvent, MessageState};
use crate::transport::ChatTransport;

/// Shown when the backend cannot be reached or answers with an error status.
pub const CONNECT_ERROR_TEXT: &str = "❌ Cannot connect to server. Please try again.";

#[derive(Default)]
struct SessionState {
    /// Lifecycle of the latest message; `None` before the first send.
    lifecycle: Option<Lifecycle>,
    reveal: Option<RevealHandle>,
    /// Bumped by every send and clear. A send whose generation is stale
    /// must not touch the transcript.
    generation: u64,
}

impl SessionState {
    fn can_send(&self) -> bool {
        self.lifecycle
            .as_ref()
            .is_none_or(|lc| lc.state().is_terminal())
    }
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    transcript: Mount,
    revealer: Revealer,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// `transcript` should be a mount whose element is a
    /// [`Tag::Transcript`]; messages are appended to it.
    pub fn new(transport: Arc<dyn ChatTransport>, transcript: Mount, revealer: Revealer) -> Self {
        Self {
            transport,
            transcript,
            revealer,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn transcript(&self) -> &Mount {
        &self.transcript
    }

    /// State of the latest message, if any was sent since the last clear.
    pub fn state(&self) -> Option<MessageState> {
        self.state.lock().lifecycle.as_ref().map(Lifecycle::state)
    }

    pub fn can_send(&self) -> bool {
        self.state.lock().can_send()
    }

    /// The reveal currently typing out a reply, if any.
    pub fn active_reveal(&self) -> Option<RevealHandle> {
        self.state
            .lock()
            .reveal
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .cloned()
    }

    /// Sends a message and drives it to a terminal state.
    ///
    /// Returns the final state, or `None` when the input was blank or the
    /// session was cleared while the message was in flight. A reply that
    /// arrives after the transcript itself was unmounted settles the message
    /// without showing anything. Transport and
    /// protocol failures are rendered into the transcript and reported as
    /// [`MessageState::Failed`], not as errors.
    pub async fn send(&self, text: &str) -> Result<Option<MessageState>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let generation = {
            let mut state = self.state.lock();
            if !state.can_send() {
                return Err(ChatError::Busy);
            }
            state.lifecycle = Some(Lifecycle::new());
            state.reveal = None;
            state.generation += 1;

            self.transcript
                .append(Element::with_text(Tag::Message(MessageKind::User), text));
            self.transcript.append(Element::new(Tag::TypingIndicator));
            state.generation
        };
        debug!(generation, "Message pending");

        let result = self.transport.send(text).await;

        let task = {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(generation, "Session cleared while message was pending");
                return Ok(None);
            }
            self.transcript.remove_last_with_tag(Tag::TypingIndicator);

            let reply = match result {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(error = %e, "Chat request failed");
                    self.transcript.append(Element::with_text(
                        Tag::Message(MessageKind::Error),
                        failure_text(&e),
                    ));
                    return apply(&mut state, LifecycleEvent::RequestFailed).map(Some);
                }
            };

            apply(&mut state, LifecycleEvent::ResponseReceived)?;
            let Some(message) = self
                .transcript
                .append(Element::new(Tag::Message(MessageKind::Assistant)))
            else {
                warn!("Transcript is no longer mounted; reply dropped");
                return apply(&mut state, LifecycleEvent::RevealFinished).map(Some);
            };
            let task = self.revealer.reveal(&message, &normalize(&reply));
            state.reveal = Some(task.handle());
            task
        };

        let outcome = task.join().await;
        debug!(?outcome, "Reply revealed");

        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(None);
        }
        state.reveal = None;
        apply(&mut state, LifecycleEvent::RevealFinished).map(Some)
    }

    /// Cancels any reveal, empties the transcript and forgets the last
    /// message. The backend is told to clear on a best-effort basis.
    pub async fn clear(&self) {
        let reveal = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.reveal.take()
        };
        if let Some(reveal) = reveal {
            reveal.cancel_and_wait().await;
        }

        {
            // A send may have started while the reveal wound down. It is
            // dropped along with everything else.
            let mut state = self.state.lock();
            state.generation += 1;
            if let Some(reveal) = state.reveal.take() {
                reveal.cancel();
            }
            self.transcript.clear();
            state.lifecycle = None;
        }
        info!("Conversation cleared");

        if let Err(e) = self.transport.clear().await {
            warn!(error = %e, "Backend clear failed");
        }
    }
}

fn apply(state: &mut SessionState, event: LifecycleEvent) -> Result<MessageState, ChatError> {
    let lifecycle = state.lifecycle.get_or_insert_with(Lifecycle::new);
    lifecycle
        .apply(event)
        .map_err(|e| ChatError::Other(anyhow::Error::new(e)))
}

fn failure_text(err: &ChatError) -> String {
    match err {
        ChatError::Transport(_) => CONNECT_ERROR_TEXT.to_string(),
        ChatError::Protocol(detail) => format!("Error: {detail}"),
        other => format!("Error: {other}"),
    }
}
