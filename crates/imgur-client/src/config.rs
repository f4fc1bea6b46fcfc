//! Client configuration with YAML support

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default API endpoints
pub const DEFAULT_BASE_URL: &str = "https://api.imgur.com";
const IMAGE_PATH: &str = "/3/image";
const GEN_TOKEN_PATH: &str = "/oauth2/token";
const AUTHORIZATION_PATH: &str = "/oauth2/authorize";

/// Conventional location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "./config/imgur.yaml";

/// Imgur client configuration
///
/// One instance is built at startup and owned by the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Public application credential sent as `Client-ID`
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Base for per-image operations (`{image_url}/{deletehash}`)
    #[serde(default = "default_image_url")]
    pub image_url: String,

    #[serde(default = "default_gen_token_url")]
    pub gen_token_url: String,

    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            upload_url: default_upload_url(),
            image_url: default_image_url(),
            gen_token_url: default_gen_token_url(),
            authorization_url: default_authorization_url(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

fn default_upload_url() -> String {
    format!("{}{}", DEFAULT_BASE_URL, IMAGE_PATH)
}

fn default_image_url() -> String {
    format!("{}{}", DEFAULT_BASE_URL, IMAGE_PATH)
}

fn default_gen_token_url() -> String {
    format!("{}{}", DEFAULT_BASE_URL, GEN_TOKEN_PATH)
}

fn default_authorization_url() -> String {
    format!("{}{}", DEFAULT_BASE_URL, AUTHORIZATION_PATH)
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Whole-request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
        }
    }
}

impl TimeoutsConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    10_000
}

impl ClientConfig {
    /// Create a builder for programmatic configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Build a configuration from defaults overlaid with a config source
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply(source)?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_source(&YamlConfigSource::from_file(path)?)
    }

    /// Overlay values from a config source.
    ///
    /// `BaseUrl` moves every endpoint onto a new host first; explicit
    /// per-endpoint keys win over it.
    pub fn apply(&mut self, source: &dyn ConfigSource) -> Result<(), ConfigError> {
        let mut next = self.clone();

        if let Some(client_id) = source.load("ClientID") {
            next.client_id = client_id;
        }
        if let Some(client_secret) = source.load("ClientSecret") {
            next.client_secret = client_secret;
        }
        if let Some(base) = source.load("BaseUrl") {
            next.rebase(&base)?;
        }

        let overrides = [
            ("UploadUrl", &mut next.upload_url),
            ("ImageUrl", &mut next.image_url),
            ("GenTokenUrl", &mut next.gen_token_url),
            ("AuthorizationUrl", &mut next.authorization_url),
        ];
        for (key, field) in overrides {
            if let Some(value) = source.load(key) {
                Url::parse(&value).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", key, e)))?;
                *field = value;
            }
        }

        *self = next;
        Ok(())
    }

    /// Point every endpoint at a different base URL.
    ///
    /// The base may carry a path prefix but no query or fragment.
    pub fn rebase(&mut self, base: &str) -> Result<(), ConfigError> {
        let base = Url::parse(base).map_err(|e| ConfigError::InvalidUrl(format!("BaseUrl: {}", e)))?;
        if base.query().is_some() || base.fragment().is_some() {
            return Err(ConfigError::InvalidUrl(format!(
                "BaseUrl: query and fragment are not allowed: {}",
                base
            )));
        }
        let base = base.as_str().trim_end_matches('/');

        self.upload_url = format!("{}{}", base, IMAGE_PATH);
        self.image_url = format!("{}{}", base, IMAGE_PATH);
        self.gen_token_url = format!("{}{}", base, GEN_TOKEN_PATH);
        self.authorization_url = format!("{}{}", base, AUTHORIZATION_PATH);
        Ok(())
    }
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = id.into();
        self
    }

    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.client_secret = secret.into();
        self
    }

    /// Move all endpoints to a different host (e.g. a local stub)
    pub fn base_url(mut self, base: &str) -> Result<Self, ConfigError> {
        self.config.rebase(base)?;
        Ok(self)
    }

    pub fn upload_url(mut self, url: impl Into<String>) -> Self {
        self.config.upload_url = url.into();
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_url = url.into();
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = ms;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = ms;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Config Sources
// =============================================================================

/// Key-value store the configuration is read from
pub trait ConfigSource {
    fn load(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn load(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// YAML mapping loaded from a file
#[derive(Debug, Clone, Default)]
pub struct YamlConfigSource {
    values: HashMap<String, String>,
}

impl YamlConfigSource {
    /// Read a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Read the file at [`DEFAULT_CONFIG_PATH`]
    pub fn from_default_location() -> Result<Self, ConfigError> {
        Self::from_file(PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Parse a YAML mapping; scalar values are stringified
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mapping: serde_yaml::Mapping =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut values = HashMap::new();
        for (key, value) in mapping {
            let key = scalar_to_string(&key)
                .ok_or_else(|| ConfigError::Parse(format!("non-scalar key: {:?}", key)))?;
            if let Some(value) = scalar_to_string(&value) {
                values.insert(key, value);
            }
        }

        Ok(Self { values })
    }
}

impl ConfigSource for YamlConfigSource {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Environment variables: `ClientID` is read from `IMGUR_CLIENT_ID`
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    /// Environment variable name for a config key
    pub fn var_name(key: &str) -> String {
        let mut name = String::from("IMGUR");
        let mut prev_lower = false;
        for c in key.chars() {
            if c.is_ascii_uppercase() && prev_lower {
                name.push('_');
            } else if name.len() == 5 {
                name.push('_');
            }
            name.push(c.to_ascii_uppercase());
            prev_lower = c.is_ascii_lowercase();
        }
        name
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self, key: &str) -> Option<String> {
        std::env::var(Self::var_name(key))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.upload_url, "https://api.imgur.com/3/image");
        assert_eq!(config.gen_token_url, "https://api.imgur.com/oauth2/token");
        assert_eq!(
            config.authorization_url,
            "https://api.imgur.com/oauth2/authorize"
        );
        assert_eq!(config.timeouts.request(), Duration::from_secs(30));
    }

    #[test]
    fn test_yaml_source() {
        let yaml = r#"
ClientID: abc123
ClientSecret: s3cr3t
BaseUrl: "http://localhost:8080/"
"#;
        let source = YamlConfigSource::from_yaml(yaml).unwrap();
        assert_eq!(source.load("ClientID").as_deref(), Some("abc123"));

        let config = ClientConfig::from_source(&source).unwrap();
        assert_eq!(config.client_id, "abc123");
        assert_eq!(config.client_secret, "s3cr3t");
        assert_eq!(config.upload_url, "http://localhost:8080/3/image");
        assert_eq!(config.image_url, "http://localhost:8080/3/image");
        assert_eq!(config.gen_token_url, "http://localhost:8080/oauth2/token");
    }

    #[test]
    fn test_explicit_url_beats_base_url() {
        let mut values = HashMap::new();
        values.insert("BaseUrl".to_string(), "http://stub:1234".to_string());
        values.insert(
            "UploadUrl".to_string(),
            "http://upload.example/v3/image".to_string(),
        );

        let config = ClientConfig::from_source(&values).unwrap();
        assert_eq!(config.upload_url, "http://upload.example/v3/image");
        assert_eq!(config.image_url, "http://stub:1234/3/image");
    }

    #[test]
    fn test_numeric_client_id() {
        let source = YamlConfigSource::from_yaml("ClientID: 12345\n").unwrap();
        assert_eq!(source.load("ClientID").as_deref(), Some("12345"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = YamlConfigSource::from_yaml("ClientID: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = YamlConfigSource::from_yaml("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut values = HashMap::new();
        values.insert("BaseUrl".to_string(), "not a url".to_string());
        let err = ClientConfig::from_source(&values).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = YamlConfigSource::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgur.yaml");
        std::fs::write(&path, "ClientID: from-file\n").unwrap();

        let config = ClientConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.client_id, "from-file");
        assert_eq!(config.upload_url, "https://api.imgur.com/3/image");
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(EnvConfigSource::var_name("ClientID"), "IMGUR_CLIENT_ID");
        assert_eq!(
            EnvConfigSource::var_name("ClientSecret"),
            "IMGUR_CLIENT_SECRET"
        );
        assert_eq!(EnvConfigSource::var_name("BaseUrl"), "IMGUR_BASE_URL");
        assert_eq!(
            EnvConfigSource::var_name("AuthorizationUrl"),
            "IMGUR_AUTHORIZATION_URL"
        );
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .client_id("id")
            .base_url("http://127.0.0.1:9000")
            .unwrap()
            .request_timeout_ms(5_000)
            .build();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.upload_url, "http://127.0.0.1:9000/3/image");
        assert_eq!(config.timeouts.request_ms, 5_000);
    }

    #[test]
    fn test_failed_apply_leaves_config_untouched() {
        let mut config = ClientConfig::builder().client_id("original").build();
        let before = config.clone();

        let mut values = HashMap::new();
        values.insert("ClientID".to_string(), "replacement".to_string());
        values.insert("BaseUrl".to_string(), "http://other.example".to_string());
        values.insert("GenTokenUrl".to_string(), "not a url".to_string());

        let err = config.apply(&values).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
        assert_eq!(config, before);
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8080/mock/")
            .unwrap()
            .build();
        assert_eq!(config.upload_url, "http://localhost:8080/mock/3/image");
    }

    #[test]
    fn test_base_url_rejects_query_and_fragment() {
        for base in ["http://localhost:8080/?key=1", "http://localhost:8080/#frag"] {
            let err = ClientConfig::builder().base_url(base).err().unwrap();
            assert!(matches!(err, ConfigError::InvalidUrl(_)), "{}", base);
        }
    }
}
