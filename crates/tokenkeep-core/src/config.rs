//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL, request timeout, and last used
//! username.
//!
//! Configuration is stored at `~/.config/tokenkeep/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::REQUEST_TIMEOUT_SECS;

/// Application name used for config directory paths
const APP_NAME: &str = "tokenkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend address used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8083";

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "TOKENKEEP_BASE_URL";

/// Login credentials read by the CLI instead of prompting
pub const USERNAME_ENV: &str = "TOKENKEEP_USERNAME";
pub const PASSWORD_ENV: &str = "TOKENKEEP_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            last_username: None,
        }
    }
}

impl Config {
    /// Load from the user's config directory, then apply environment
    /// overrides. A missing config directory or unreadable file falls back
    /// to the defaults.
    pub fn load_or_default() -> Self {
        let mut config = Self::load_path_or_default(Self::config_path());
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    fn load_path_or_default(path: Result<PathBuf>) -> Self {
        path.and_then(|path| Self::load_from(&path))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Record `username` as the last login in the config file, leaving the
    /// other saved settings (and not the environment overrides) in place
    pub fn remember_username(username: &str) -> Result<()> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.last_username = Some(username.to_string());
        config.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// `load_or_default`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Origin (scheme, host, port) of the backend, used to scope storage
    pub fn origin(&self) -> Result<String> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        Ok(url.origin().ascii_serialization())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8083");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            base_url: "https://rentals.example.com".to_string(),
            request_timeout_secs: 5,
            last_username: Some("alice".to_string()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_username": "bob"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.last_username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_unusable_config_falls_back_to_defaults() {
        let missing_dir = Config::load_path_or_default(Err(anyhow::anyhow!("no config dir")));
        assert_eq!(missing_dir, Config::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert_eq!(Config::load_path_or_default(Ok(path)), Config::default());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_overrides(|name| {
            (name == BASE_URL_ENV).then(|| " https://api.example.com ".to_string())
        });
        assert_eq!(config.base_url, "https://api.example.com");

        // Blank values are ignored
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_origin() {
        let mut config = Config::default();
        assert_eq!(config.origin().unwrap(), "http://localhost:8083");

        config.base_url = "https://Example.com/api/v1".to_string();
        assert_eq!(config.origin().unwrap(), "https://example.com");

        config.base_url = "not a url".to_string();
        assert!(config.origin().is_err());
    }
}
