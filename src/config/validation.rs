//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{Result, VolunteerHubError};
use regex::Regex;
use url::Url;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_mailer_config(&settings.mailer)?;
    validate_registration_config(&settings.registration)?;
    validate_scheduler_config(&settings.scheduler)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(VolunteerHubError::Config(
            "Database URL is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(VolunteerHubError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(VolunteerHubError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(VolunteerHubError::Config(
            "Redis URL is required".to_string(),
        ));
    }

    if config.prefix.is_empty() {
        return Err(VolunteerHubError::Config(
            "Redis key prefix is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate mail gateway configuration
fn validate_mailer_config(config: &super::MailerConfig) -> Result<()> {
    if let Some(ref endpoint) = config.endpoint {
        Url::parse(endpoint)?;
    }

    let email_pattern = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| VolunteerHubError::Internal(format!("Email pattern failed to compile: {}", e)))?;
    if !email_pattern.is_match(&config.from_address) {
        return Err(VolunteerHubError::Config(format!(
            "Invalid mailer from address: {}",
            config.from_address
        )));
    }

    if config.timeout_seconds == 0 {
        return Err(VolunteerHubError::Config(
            "Mailer timeout must be greater than 0".to_string(),
        ));
    }

    if config.rate_limit_per_minute == 0 {
        return Err(VolunteerHubError::Config(
            "Mailer rate limit must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate registration retry configuration
fn validate_registration_config(config: &super::RegistrationConfig) -> Result<()> {
    if config.max_attempts == 0 {
        return Err(VolunteerHubError::Config(
            "Registration max attempts must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate completion sweep configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    if config.sweep_interval_seconds == 0 {
        return Err(VolunteerHubError::Config(
            "Sweep interval must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(VolunteerHubError::Config(
            "Log level is required".to_string(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(VolunteerHubError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
