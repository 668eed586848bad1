//! Config validation with user-friendly error messages.

use crate::schema::ClientConfig;
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

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ClientConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_api_url(config, &mut report);
    validate_timeouts(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_api_url(config: &ClientConfig, report: &mut ValidationReport) {
    let url = config.api_url.trim();
    if url.is_empty() {
        report.error("apiUrl", "Backend URL is empty");
        return;
    }
    let Some((scheme, rest)) = url.split_once("://") else {
        report.error("apiUrl", format!("'{url}' is missing a scheme (http:// or https://)"));
        return;
    };
    match scheme {
        "http" | "https" => {}
        other => report.error("apiUrl", format!("Unsupported scheme '{other}'")),
    }
    if rest.is_empty() || rest.starts_with('/') {
        report.error("apiUrl", format!("'{url}' has no host"));
    }
    if url.contains('?') || url.contains('#') {
        report.warn("apiUrl", "Query strings and fragments are dropped from the base URL");
    }
}

fn validate_timeouts(config: &ClientConfig, report: &mut ValidationReport) {
    if config.request_timeout_secs == 0 {
        report.error("requestTimeoutSecs", "Must be greater than zero");
    }
    if config.connect_timeout_secs == 0 {
        report.error("connectTimeoutSecs", "Must be greater than zero");
    }
    if config.connect_timeout_secs > config.request_timeout_secs {
        report.warn(
            "connectTimeoutSecs",
            "Exceeds requestTimeoutSecs; the request timeout wins",
        );
    }
}

fn validate_logging(config: &ClientConfig, report: &mut ValidationReport) {
    // Full EnvFilter directives (e.g. "zeorag_client=debug") are allowed;
    // only bare words are checked.
    let level = config.log_level.trim();
    if !level.contains('=') && !KNOWN_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}
