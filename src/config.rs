//! File-based client configuration.
//!
//! ```json
//! {
//!   "backends": [
//!     { "name": "anti-captcha", "host": "http://anti-captcha.com", "key": "..." },
//!     { "name": "rucaptcha", "host": "http://rucaptcha.com", "key": "..." }
//!   ],
//!   "active": "rucaptcha",
//!   "poll_interval_ms": 3000,
//!   "timeout_ms": 300000
//! }
//! ```

use crate::error::Result;
use crate::models::Backend;
use crate::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

/// Serializable client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backends: Vec<Backend>,
    /// Name of the initially active backend; the first one if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Per-request HTTP timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            active: None,
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: None,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Platform config location, e.g. `~/.config/anticaptcha-rs/config.json`.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "anticaptcha", "anticaptcha-rs")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("config.json")
    }

    /// Read a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Read the config at [`ClientConfig::default_path`], if there is one.
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptchaError;

    #[test]
    fn test_defaults_applied() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"backends": [{"host": "http://anti-captcha.com", "key": "k"}]}"#,
        )
        .unwrap();
        assert_eq!(config.poll_interval_ms, 3_000);
        assert_eq!(config.timeout_ms, 300_000);
        assert_eq!(config.backends[0].name, None);
        assert_eq!(config.active, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ClientConfig {
            backends: vec![Backend::named("rucaptcha", "http://rucaptcha.com", "k")],
            active: Some("rucaptcha".into()),
            proxy: Some("socks5://127.0.0.1:1080".into()),
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(CaptchaError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ClientConfig::load("/no/such/dir/config.json"),
            Err(CaptchaError::Io(_))
        ));
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(ClientConfig::default_path().ends_with("config.json"));
    }
}
