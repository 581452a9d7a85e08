//! Configuration management for the service health tracker

use crate::errors::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Path to the JSON document holding the service registry
    pub data_file: PathBuf,

    /// Fallback log filter when RUST_LOG is not set
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable text
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("service_data.json"),
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(data_file) = lookup("SERVICE_DATA_FILE") {
            config.data_file = PathBuf::from(data_file);
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.json_logs = format.to_lowercase() == "json";
        }

        config
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        data_file: Option<PathBuf>,
        log_level: Option<String>,
        json_logs: bool,
    ) -> Self {
        if let Some(data_file) = data_file {
            self.data_file = data_file;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        self.json_logs |= json_logs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(TrackerError::Config("data_file cannot be empty".to_string()));
        }

        if self.log_level.trim().is_empty() {
            return Err(TrackerError::Config("log_level cannot be empty".to_string()));
        }

        Ok(())
    }
}
