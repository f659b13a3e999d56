//! Error handling for VolunteerHub
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the VolunteerHub application
#[derive(Error, Debug)]
pub enum VolunteerHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Mail gateway error: {0}")]
    Mailer(#[from] MailerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Event not found for slug: {slug}")]
    EventSlugNotFound { slug: String },

    #[error("Position {position_id} not found for event {event_id}")]
    PositionNotFound { event_id: i64, position_id: i64 },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Notification not found: {notification_id}")]
    NotificationNotFound { notification_id: i64 },

    #[error("No slots available for position {position_id}")]
    SlotsExhausted { position_id: i64 },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, user_id: i64 },

    #[error("Event is not accepting registrations in state '{state}'")]
    RegistrationClosed { state: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Summary already published for event {event_id}")]
    SummaryAlreadyPublished { event_id: i64 },

    #[error("User {user_id} is not eligible for event {event_id}")]
    NotEligible { event_id: i64, user_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Resource busy: {0}")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Mail gateway specific errors
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Mail gateway request failed: {0}")]
    RequestFailed(String),

    #[error("Mail gateway timeout")]
    Timeout,

    #[error("Invalid mail gateway response: {0}")]
    InvalidResponse(String),

    #[error("Mail gateway unavailable")]
    ServiceUnavailable,
}

/// Result type alias for VolunteerHub operations
pub type Result<T> = std::result::Result<T, VolunteerHubError>;

/// Result type alias for mail gateway operations
pub type MailerResult<T> = std::result::Result<T, MailerError>;

impl From<config::ConfigError> for VolunteerHubError {
    fn from(err: config::ConfigError) -> Self {
        VolunteerHubError::Config(err.to_string())
    }
}

impl VolunteerHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            VolunteerHubError::Database(_) => false,
            VolunteerHubError::Migration(_) => false,
            VolunteerHubError::Redis(_) => true,
            VolunteerHubError::Mailer(_) => true,
            VolunteerHubError::Config(_) => false,
            VolunteerHubError::Serialization(_) => false,
            VolunteerHubError::Io(_) => true,
            VolunteerHubError::UrlParse(_) => false,
            VolunteerHubError::EventNotFound { .. } => false,
            VolunteerHubError::EventSlugNotFound { .. } => false,
            VolunteerHubError::PositionNotFound { .. } => false,
            VolunteerHubError::TaskNotFound { .. } => false,
            VolunteerHubError::UserNotFound { .. } => false,
            VolunteerHubError::NotificationNotFound { .. } => false,
            VolunteerHubError::SlotsExhausted { .. } => false,
            VolunteerHubError::AlreadyRegistered { .. } => false,
            VolunteerHubError::RegistrationClosed { .. } => false,
            VolunteerHubError::InvalidStateTransition { .. } => false,
            VolunteerHubError::SummaryAlreadyPublished { .. } => false,
            VolunteerHubError::NotEligible { .. } => false,
            VolunteerHubError::Conflict(_) => false,
            VolunteerHubError::Validation(_) => false,
            VolunteerHubError::Busy(_) => true,
            VolunteerHubError::Internal(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VolunteerHubError::Database(_) => ErrorSeverity::Critical,
            VolunteerHubError::Migration(_) => ErrorSeverity::Critical,
            VolunteerHubError::Config(_) => ErrorSeverity::Critical,
            VolunteerHubError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            VolunteerHubError::RegistrationClosed { .. } => ErrorSeverity::Warning,
            VolunteerHubError::SummaryAlreadyPublished { .. } => ErrorSeverity::Warning,
            VolunteerHubError::NotEligible { .. } => ErrorSeverity::Warning,
            VolunteerHubError::SlotsExhausted { .. } => ErrorSeverity::Warning,
            VolunteerHubError::AlreadyRegistered { .. } => ErrorSeverity::Warning,
            VolunteerHubError::Conflict(_) => ErrorSeverity::Warning,
            VolunteerHubError::Busy(_) => ErrorSeverity::Warning,
            VolunteerHubError::Validation(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VolunteerHubError::EventNotFound { event_id: 42 };
        assert_eq!(err.to_string(), "Event not found: 42");

        let err = VolunteerHubError::SlotsExhausted { position_id: 7 };
        assert_eq!(err.to_string(), "No slots available for position 7");

        let err = VolunteerHubError::RegistrationClosed {
            state: "pending".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Event is not accepting registrations in state 'pending'"
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(!VolunteerHubError::Config("missing database url".to_string()).is_recoverable());
        assert!(!VolunteerHubError::AlreadyRegistered {
            event_id: 1,
            user_id: 2
        }
        .is_recoverable());
        assert!(VolunteerHubError::Busy("registration contention".to_string()).is_recoverable());
        assert!(VolunteerHubError::Mailer(MailerError::Timeout).is_recoverable());
    }

    #[test]
    fn test_severity() {
        let err = VolunteerHubError::Config("bad config".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = VolunteerHubError::SlotsExhausted { position_id: 3 };
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = VolunteerHubError::Validation("rating out of range".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Info);

        let err = VolunteerHubError::EventNotFound { event_id: 1 };
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_mailer_error_conversion() {
        let err: VolunteerHubError = MailerError::ServiceUnavailable.into();
        assert!(matches!(err, VolunteerHubError::Mailer(_)));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
