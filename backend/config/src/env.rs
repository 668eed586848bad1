//! Environment overlay for the client config.
//!
//! Recognised variables:
//! - `ZEORAG_API_URL`
//! - `ZEORAG_TIMEOUT_SECS`
//! - `ZEORAG_CONNECT_TIMEOUT_SECS`
//! - `ZEORAG_LOG_LEVEL`
//! - `ZEORAG_LOG_DIR`
//!
//! Empty values are ignored. Unparseable numbers are ignored with a warning.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

use crate::schema::ClientConfig;

pub const ENV_API_URL: &str = "ZEORAG_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "ZEORAG_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ZEORAG_CONNECT_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "ZEORAG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ZEORAG_LOG_DIR";

/// Apply the process environment over `config`.
pub fn apply_env(config: ClientConfig) -> ClientConfig {
    apply_env_with(config, &std::env::vars().collect())
}

/// Apply a provided variable map over `config` (useful for testing).
pub fn apply_env_with(mut config: ClientConfig, env: &HashMap<String, String>) -> ClientConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(url) = get(ENV_API_URL) {
        config.api_url = url;
    }
    if let Some(secs) = get(ENV_TIMEOUT_SECS).and_then(|v| parse_secs(ENV_TIMEOUT_SECS, &v)) {
        config.request_timeout_secs = secs;
    }
    if let Some(secs) =
        get(ENV_CONNECT_TIMEOUT_SECS).and_then(|v| parse_secs(ENV_CONNECT_TIMEOUT_SECS, &v))
    {
        config.connect_timeout_secs = secs;
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.log_level = level;
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        config.log_dir = Some(PathBuf::from(dir));
    }
    config
}

fn parse_secs(key: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(var = key, value = raw, "Ignoring non-numeric timeout");
            None
        }
    }
}
