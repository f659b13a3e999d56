//! VolunteerHub event service
//!
//! The core service for event volunteering: the event lifecycle state
//! machine, capacity-safe slot registration, task assignment guards,
//! summary and feedback gating, and the notification fan-out that
//! accompanies lifecycle transitions.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, VolunteerHubError};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use scheduler::CompletionSweeper;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
