//! Config defaults: applies sensible default values to parsed config.

use crate::schema::LlamaChatConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TEXT_MS: u64 = 20;
pub const DEFAULT_SPAN_MS: u64 = 60;
pub const DEFAULT_CONTAINER_MS: u64 = 150;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: LlamaChatConfig) -> LlamaChatConfig {
    let config = apply_server_defaults(config);
    let config = apply_provider_defaults(config);
    let config = apply_reveal_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: LlamaChatConfig) -> LlamaChatConfig {
    let server = &mut config.server;
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
        .client
        .api_url
        .get_or_insert_with(|| DEFAULT_API_URL.to_string());
    config
}

fn apply_provider_defaults(mut config: LlamaChatConfig) -> LlamaChatConfig {
    let provider = &mut config.provider;
    provider.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    provider.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    provider.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    config
}

fn apply_reveal_defaults(mut config: LlamaChatConfig) -> LlamaChatConfig {
    let reveal = &mut config.reveal;
    reveal.text_ms.get_or_insert(DEFAULT_TEXT_MS);
    reveal.span_ms.get_or_insert(DEFAULT_SPAN_MS);
    reveal.container_ms.get_or_insert(DEFAULT_CONTAINER_MS);
    config
}

fn apply_logging_defaults(mut config: LlamaChatConfig) -> LlamaChatConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
