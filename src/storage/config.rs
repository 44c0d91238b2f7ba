//! JSON Configuration Management
//!
//! Reads `<data dir>/config.json` (runtime options that are not part of the
//! user-facing settings snapshot) and applies environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};
use prompt_stash_llm::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Overrides `apiUrl`
pub const API_URL_ENV: &str = "PROMPT_STASH_API_URL";
/// Overrides `model`
pub const MODEL_ENV: &str = "PROMPT_STASH_MODEL";
/// Overrides `requestTimeoutSecs`
pub const TIMEOUT_ENV: &str = "PROMPT_STASH_TIMEOUT_SECS";

/// Runtime configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Chat completion endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String,
    /// Whole-request deadline for chat calls
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(format!(
                "Invalid apiUrl: {}. Must start with http:// or https://",
                self.api_url
            ));
        }
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 600 {
            return Err("requestTimeoutSecs must be between 1 and 600".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply environment overrides from an arbitrary lookup (testable)
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?;
        }
        Ok(())
    }
}

/// Configuration service for runtime options
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: RuntimeConfig,
}

impl ConfigService {
    /// Load config.json from `data_dir`, creating it with defaults when missing
    pub fn load(data_dir: &Path) -> AppResult<Self> {
        ensure_dir(data_dir)?;

        let config_path = config_path(data_dir);
        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = RuntimeConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        config
            .apply_overrides(|name| std::env::var(name).ok())
            .map_err(AppError::config)?;
        config.validate().map_err(AppError::config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<RuntimeConfig> {
        let content = fs::read_to_string(path)?;
        let config: RuntimeConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &RuntimeConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Check if the config service is healthy
    pub fn is_healthy(&self) -> bool {
        self.config_path.exists() && self.config.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_creates_default_file() {
        let temp = tempfile::tempdir().unwrap();
        let service = ConfigService::load(temp.path()).unwrap();
        assert!(temp.path().join("config.json").exists());
        assert!(service.is_healthy());
        assert_eq!(service.get_config().request_timeout_secs, 60);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"model": "gpt-4o"}"#).unwrap();

        let config = ConfigService::load_from_file(&path).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"apiUrl": "ftp://example.com"}"#).unwrap();
        assert!(ConfigService::load_from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "http://127.0.0.1:8080/v1/chat/completions"),
            (TIMEOUT_ENV, "5"),
        ]
        .into_iter()
        .collect();

        let mut config = RuntimeConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.model, DEFAULT_MODEL);

        let mut config = RuntimeConfig::default();
        let err = config
            .apply_overrides(|name| (name == TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.contains(TIMEOUT_ENV));
    }
}
