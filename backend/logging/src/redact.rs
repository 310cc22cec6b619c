//! Log Redaction Layer
//!
//! Scrubs provider API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(gsk|sk)[-_][A-Za-z0-9]{16,}|Bearer\s+[A-Za-z0-9\-\._~+/]+=*").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_keys_and_bearer() {
        let raw = "key gsk_abcdefghijklmnop1234 then Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("gsk_abcdefghijklmnop1234"));
        assert!(!clean.contains("eyJhbGci"));
        assert_eq!(clean.matches("[REDACTED_TOKEN]").count(), 2);
    }

    #[test]
    fn test_plain_text_untouched() {
        let raw = "**Hi** there: - one - two";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
