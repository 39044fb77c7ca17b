//! Configuration service for reading and updating the config file

use crate::AppError;
use crate::error::ConfigError;
use crate::storage::config::Config;
use crate::utils::validation::validate_url;
use std::path::PathBuf;

pub const CONFIG_FIELDS: &[&str] = &["server_url", "page_size", "timeout_secs"];

/// Configuration service for managing application configuration
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current value of a field as displayed by `config show`
    pub fn get_field(&self, field: &str) -> Result<Option<String>, AppError> {
        match field {
            "server_url" => Ok(self.config.server_url.clone()),
            "page_size" => Ok(self.config.page_size.map(|v| v.to_string())),
            "timeout_secs" => Ok(self.config.timeout_secs.map(|v| v.to_string())),
            _ => Err(ConfigError::UnknownField {
                field: field.to_string(),
            }
            .into()),
        }
    }

    /// Parse and store a field value
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), AppError> {
        match field {
            "server_url" => {
                validate_url(value)?;
                self.config.server_url = Some(value.trim_end_matches('/').to_string());
            }
            "page_size" => {
                let page_size = parse_positive(field, value)?;
                self.config.page_size = Some(page_size as usize);
            }
            "timeout_secs" => {
                self.config.timeout_secs = Some(parse_positive(field, value)?);
            }
            _ => {
                return Err(ConfigError::UnknownField {
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }
}

fn parse_positive(field: &str, value: &str) -> Result<u64, AppError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected a positive integer".to_string(),
        }
        .into()),
    }
}
