//! Configuration management
//!
//! Priority for the server URL: CLI argument > TREEHERDER_URL environment
//! variable > config.toml > built-in default.

use super::Result;
use crate::api::client::{ClientConfig, DEFAULT_SERVER_URL};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const SERVER_URL_ENV: &str = "TREEHERDER_URL";

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Treeherder server URL
    pub server_url: Option<String>,
    /// Largest page requested from paginated endpoints
    pub page_size: Option<usize>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(home_dir
            .join(".config")
            .join("lumberjack")
            .join("config.toml"))
    }

    /// Server URL with fallback to the environment variable
    pub fn get_server_url(&self) -> Option<String> {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.server_url.clone())
    }

    /// Build the client settings, `server_override` taking precedence.
    pub fn to_client_config(
        &self,
        server_override: Option<&str>,
        api_key: Option<String>,
    ) -> ClientConfig {
        let server_url = server_override
            .map(str::to_string)
            .or_else(|| self.get_server_url())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let mut config = ClientConfig::new(server_url);
        if let Some(page_size) = self.page_size {
            config = config.with_page_size(page_size);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(timeout_secs));
        }
        if let Some(api_key) = api_key {
            config = config.with_api_key(api_key);
        }
        config
    }
}
