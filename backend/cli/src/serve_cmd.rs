//! `llamachat serve`: run the gateway with the Groq provider.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use llamachat_config::LlamaChatConfig;
use llamachat_gateway::{start_server, CompletionSettings, GatewayState};
use llamachat_providers::GroqProvider;

use crate::console::Console;

pub async fn run(config: &LlamaChatConfig, port: Option<u16>) -> Result<()> {
    let api_key = config
        .provider
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .context("GROQ_API_KEY not found! Set it in the environment or as provider.apiKey")?;

    let mut provider = GroqProvider::new(api_key);
    if let Some(url) = &config.provider.base_url {
        provider = provider.with_base_url(url);
    }

    let settings = CompletionSettings {
        model: config.provider.model().to_string(),
        system_prompt: config.provider.system_prompt().to_string(),
        temperature: config.provider.temperature(),
        max_tokens: config.provider.max_tokens(),
    };
    let mut state = GatewayState::new(Arc::new(provider), settings);
    if let Some(dir) = &config.server.static_dir {
        state = state.with_static_dir(dir);
    }

    let port = port.unwrap_or(config.server.port());
    let ip: IpAddr = config
        .server
        .bind()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind()))?;
    let addr = SocketAddr::new(ip, port);

    info!(port, bind = %ip, "Starting LlamaChat gateway");
    Console::detect().note(&format!("API: `http://localhost:{port}/api/status`"));
    start_server(addr, state).await
}
