//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from layered TOML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub mailer: MailerConfig,
    pub registration: RegistrationConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration for the realtime notification channel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Mail gateway configuration
///
/// The gateway is optional: when `endpoint` is unset the mailer runs
/// disabled and every send becomes a logged no-op.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailerConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    pub timeout_seconds: u64,
    pub rate_limit_per_minute: u32,
}

/// Registration retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

/// Completion sweep scheduling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    pub sweep_interval_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from layered configuration files and environment variables
    ///
    /// Files are read from the `config/` directory in order: `default`,
    /// the `RUN_MODE` file, then `local`. Environment variables prefixed
    /// with `APP__` override everything else.
    pub fn new() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load_from(Path::new("config"), &run_mode)
    }

    /// Load settings from a specific configuration directory
    pub fn load_from(dir: &Path, run_mode: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(run_mode)).required(false))
            .add_source(config::File::from(dir.join("local")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::VolunteerHubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/volunteerhub".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "volunteerhub:".to_string(),
            },
            mailer: MailerConfig {
                endpoint: None,
                api_key: None,
                from_address: "no-reply@volunteerhub.org".to_string(),
                timeout_seconds: 10,
                rate_limit_per_minute: 60,
            },
            registration: RegistrationConfig {
                max_attempts: 3,
                backoff_base_ms: 25,
            },
            scheduler: SchedulerConfig {
                sweep_interval_seconds: 86_400,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
        }
    }
}
