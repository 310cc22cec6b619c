//! Config file discovery and loading.

use crate::schema::LlamaChatConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the LlamaChat config directory.
/// Priority: `LLAMACHAT_CONFIG_DIR` env > `~/.llamachat/` > `./.llamachat/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LLAMACHAT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".llamachat"),
        None => PathBuf::from(".llamachat"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<LlamaChatConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(LlamaChatConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text into a config. An empty document yields defaults.
pub fn parse_config(raw: &str) -> Result<LlamaChatConfig> {
    if raw.trim().is_empty() {
        return Ok(LlamaChatConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&config_file_path(dir.path())).await.unwrap();
        assert!(config.server.port.is_none());
    }

    #[tokio::test]
    async fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "server:\n  port: 7000\nreveal:\n  textMs: 5\n")
            .await
            .unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.server.port, Some(7000));
        assert_eq!(config.reveal.text_ms, Some(5));
    }

    #[test]
    fn malformed_yaml_is_error() {
        assert!(parse_config("server: [unclosed").is_err());
        assert!(parse_config("  \n").is_ok());
    }
}
