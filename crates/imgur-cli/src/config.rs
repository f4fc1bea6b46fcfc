//! Configuration resolution for imgur-cli

use anyhow::{Context, Result};
use imgur_client::config::DEFAULT_CONFIG_PATH;
use imgur_client::{ClientConfig, EnvConfigSource, YamlConfigSource};
use std::path::{Path, PathBuf};

/// Locate the config file: explicit path, then `./config/imgur.yaml`,
/// then the user config directory
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(DEFAULT_CONFIG_PATH);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("imgur-cli").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Build the client configuration: defaults, config file, environment, then flags
pub fn load(explicit: Option<&Path>, client_id: Option<&str>) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    if let Some(path) = config_path(explicit) {
        tracing::debug!("Loading config from {}", path.display());
        let source = YamlConfigSource::from_file(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        config
            .apply(&source)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
    }

    config
        .apply(&EnvConfigSource)
        .context("Invalid IMGUR_* environment configuration")?;

    if let Some(id) = client_id {
        config.client_id = id.to_string();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("/tmp/some.yaml");
        assert_eq!(config_path(Some(&path)), Some(path));
    }

    #[test]
    fn test_load_from_file_and_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgur.yaml");
        std::fs::write(
            &path,
            "ClientID: file-id\nUploadUrl: http://localhost:9000/3/image\n",
        )
        .unwrap();

        let config = load(Some(&path), None).unwrap();
        assert_eq!(config.upload_url, "http://localhost:9000/3/image");

        let config = load(Some(&path), Some("flag-id")).unwrap();
        assert_eq!(config.client_id, "flag-id");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = load(Some(Path::new("/nonexistent/imgur.yaml")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
