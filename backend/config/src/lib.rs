//! `llamachat-config`: LlamaChat runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, provider, client, reveal, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, parse_config};
pub use schema::{
    ClientConfig, LlamaChatConfig, LoggingConfig, ProviderConfig, RevealConfig, ServerConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, defaults and env overrides, then validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// findings are logged; the caller decides whether errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<(LlamaChatConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;
    let config = prepare(raw_config, resolve_env_vars)?;
    let config = apply_env_overrides(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok((config, report))
}

fn prepare(
    raw: LlamaChatConfig,
    resolve: impl Fn(&Value) -> Result<Value>,
) -> Result<LlamaChatConfig> {
    // Serialize to Value for the env substitution pass.
    let value = serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve(&value).context("Failed to resolve env vars in config")?;

    let config: LlamaChatConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    Ok(apply_all_defaults(config))
}
