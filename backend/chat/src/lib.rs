//! Chat client core for LlamaChat.
//!
//! A [`ChatSession`] sends user messages through a [`ChatTransport`],
//! tracks each message's [`MessageState`] and reveals replies into a
//! transcript mount.

pub mod lifecycle;
pub mod session;
pub mod transport;

pub use lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, MessageState};
pub use session::{ChatSession, CONNECT_ERROR_TEXT};
pub use transport::{ChatTransport, HttpTransport};
