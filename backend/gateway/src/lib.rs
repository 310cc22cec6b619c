//! LlamaChat Gateway HTTP API Server
//!
//! Provides the chat REST API and optional static hosting of the web front-end.

pub mod chat_api;
pub mod control_ui;
pub mod history;
pub mod server;
pub mod status_api;

pub use history::ConversationHistory;
pub use server::{router, serve, start_server, CompletionSettings, GatewayState};
