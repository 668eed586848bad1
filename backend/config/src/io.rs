//! Config file location and loading.

use crate::schema::ConfigFile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the ZeoRAG config directory.
/// Priority: `ZEORAG_CONFIG_DIR` env > `~/.zeorag/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ZEORAG_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".zeorag"),
        None => PathBuf::from(".zeorag"),
    }
}

/// Resolve the full path to the config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config file.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ConfigFile::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let file: ConfigFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = load_config_file(&config_file_path(dir.path())).await.unwrap();
        assert!(file.api_url.is_none());
    }

    #[tokio::test]
    async fn test_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "apiUrl: http://10.0.0.5:8000\nrequestTimeoutSecs: 30\n").unwrap();

        let file = load_config_file(&path).await.unwrap();
        assert_eq!(file.api_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(file.request_timeout_secs, Some(30));
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "apiUrl: [unterminated\n").unwrap();
        assert!(load_config_file(&path).await.is_err());
    }
}
