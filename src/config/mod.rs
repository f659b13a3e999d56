//! Configuration management module
//!
//! This module handles loading and validation of application configuration
//! from layered TOML files and environment variables.

pub mod settings;
pub mod validation;

pub use settings::{
    DatabaseConfig, LoggingConfig, MailerConfig, RedisConfig, RegistrationConfig, SchedulerConfig,
    Settings,
};
