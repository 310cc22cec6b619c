pub mod error;
pub mod message;
pub mod traits;

pub use error::ChatError;
pub use message::{ChatReply, ChatRequest, ChatTurn, ClearReply, ReplyStatus, Role};
pub use traits::{LlmProvider, LlmRequest, LlmResponse};
