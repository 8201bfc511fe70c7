use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use url::Url;

/// Default configuration embedded at compile time from `config/portal.toml`.
const DEFAULT_CONFIG: &str = include_str!("../config/portal.toml");

/// Client-side settings for talking to the portal backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortalConfig {
    /// Origin the REST paths are joined onto, e.g. `https://portal.example.edu/`.
    pub base_url: Url,
    /// Key of the persisted session record.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Per-request timeout. Ignored on wasm, where the browser owns timeouts.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_storage_key() -> String {
    "authState".to_string()
}

impl PortalConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Same settings pointed at a different backend origin.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        default_config()
    }
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<PortalConfig> {
    let config: PortalConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<PortalConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// The configuration embedded in the binary.
///
/// # Panics
/// Only if the embedded `portal.toml` is invalid, which the tests rule out.
pub fn default_config() -> PortalConfig {
    parse_config(DEFAULT_CONFIG).expect("embedded portal.toml must be valid TOML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = default_config();
        assert_eq!(config.storage_key, "authState");
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_storage_key_defaults_when_missing() {
        let config = parse_config(r#"base_url = "https://portal.example.edu/""#).unwrap();
        assert_eq!(config.storage_key, "authState");
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(parse_config(r#"base_url = "not a url""#).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("portal.toml");
        std::fs::write(
            &path,
            "base_url = \"https://portal.example.edu/\"\nstorage_key = \"session\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url.host_str(), Some("portal.example.edu"));
        assert_eq!(config.storage_key, "session");
    }
}
