//! LLM completion providers.
//!
//! The gateway talks to exactly one provider at a time through the
//! [`llamachat_core::LlmProvider`] trait.

pub mod groq;
pub mod mock;

pub use groq::GroqProvider;
pub use mock::MockProvider;
