//! Structured logging for LlamaChat.
//!
//! Handles subscriber setup (console plus optional rolling JSON files), log
//! redaction, and chat event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ChatEvent, ChatEventLogger, EventLogEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
