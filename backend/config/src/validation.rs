//! Config validation with user-friendly error messages.

use crate::schema::LlamaChatConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &LlamaChatConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_provider(config, &mut report);
    validate_client(config, &mut report);
    validate_reveal(config, &mut report);
    report
}

fn validate_server(config: &LlamaChatConfig, report: &mut ValidationReport) {
    let port = config.server.port();
    if port == 0 {
        report.error("server.port", "port must be > 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

/// The gateway cannot answer without credentials; this is only a warning so
/// the terminal client can run with the same config.
fn validate_provider(config: &LlamaChatConfig, report: &mut ValidationReport) {
    let provider = &config.provider;
    if provider.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn("provider.apiKey", "GROQ_API_KEY not set; chat completions will fail");
    }
    if provider.model().trim().is_empty() {
        report.error("provider.model", "model cannot be empty");
    }
    let temperature = provider.temperature();
    if !(0.0..=2.0).contains(&temperature) {
        report.error(
            "provider.temperature",
            format!("temperature {temperature} outside 0.0..=2.0"),
        );
    }
    if provider.max_tokens() == 0 {
        report.error("provider.maxTokens", "maxTokens must be >= 1");
    }
}

fn validate_client(config: &LlamaChatConfig, report: &mut ValidationReport) {
    let url = config.client.api_url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error("client.apiUrl", format!("'{url}' is not an http(s) URL"));
    }
}

fn validate_reveal(config: &LlamaChatConfig, report: &mut ValidationReport) {
    let (text, span, container) = config.reveal.delays_ms();
    for (path, ms) in [
        ("reveal.textMs", text),
        ("reveal.spanMs", span),
        ("reveal.containerMs", container),
    ] {
        if ms > 10_000 {
            report.warn(path, format!("{ms}ms per unit makes replies crawl"));
        }
    }
}
