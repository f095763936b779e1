//! Application configuration.
//!
//! Read from `config.json` in the platform config directory. A missing file
//! means defaults; a file that exists but does not parse is an error.
//! `MANGAHUB_API_BASE` overrides the API base URL either way.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::types::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const API_BASE_ENV: &str = "MANGAHUB_API_BASE";
pub const DATABASE_FILE_NAME: &str = "mangahub.db";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub debounce_ms: u64,
    /// Where the progress database lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            debounce_ms: 500,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads `config.json` from the platform config directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&platform::get_config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads from `path`, then applies the environment override.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            config.apply_api_base_override(&base);
        }
        Ok(config)
    }

    /// Reads `path` without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ParseError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Replaces the API base URL unless `base` is blank.
    pub fn apply_api_base_override(&mut self, base: &str) {
        let base = base.trim();
        if !base.is_empty() {
            self.api_base_url = base.to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(platform::get_data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(DATABASE_FILE_NAME)
    }
}
