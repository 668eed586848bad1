//! `zeorag-config`: client configuration management.
//!
//! Provides:
//! - Typed config schema with defaults
//! - YAML file loading
//! - `ZEORAG_*` environment overlay
//! - Validation report

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env, apply_env_with};
pub use io::{config_dir, config_file_path, load_config_file};
pub use schema::{ClientConfig, ConfigFile, LoggingSection};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Resolve the client config: defaults, then the config file, then the
/// environment.
///
/// `path` overrides the default file location. The result is not
/// validated; callers apply their own overrides first, then `check`.
pub async fn load(path: Option<&Path>) -> Result<ClientConfig> {
    let default_path = config_file_path(&config_dir());
    let path = path.unwrap_or(&default_path);

    let file = load_config_file(path).await?;
    Ok(apply_env(ClientConfig::default().merge_file(file)))
}

/// Validate and log. Fails on the first batch of errors.
pub fn check(config: &ClientConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("{first}");
    }
    Ok(())
}
