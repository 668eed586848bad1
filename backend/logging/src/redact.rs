//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, and URL credentials from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static URL_CREDENTIALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<scheme>[a-zA-Z][a-zA-Z0-9+.-]*://)[^/@\s:]+:[^/@\s]+@").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9_-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // user:password@ in URLs
    let redacted = URL_CREDENTIALS_RE.replace_all(input, "${scheme}[REDACTED]@");

    // API keys and bearer tokens
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string()
}
