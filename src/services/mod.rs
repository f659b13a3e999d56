//! Services module
//!
//! This module contains business logic services

pub mod lifecycle;
pub mod mailer;
pub mod notifier;
pub mod realtime;
pub mod registration;
pub mod summary;
pub mod tasks;

// Re-export commonly used services
pub use lifecycle::EventLifecycleService;
pub use mailer::{MailRequest, MailResponse, MailerService};
pub use notifier::{FanOutStats, MessageTemplate, NotifierService};
pub use realtime::RealtimeService;
pub use registration::{RegistrationOutcome, RegistrationService};
pub use summary::SummaryService;
pub use tasks::TaskService;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub lifecycle: EventLifecycleService,
    pub registration: RegistrationService,
    pub tasks: TaskService,
    pub summaries: SummaryService,
    pub notifier: NotifierService,
    pub mailer: MailerService,
    pub realtime: RealtimeService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: DatabaseService) -> Result<Self> {
        let realtime = RealtimeService::new(settings.redis.clone())?;
        let mailer = MailerService::new(settings.mailer.clone())?;
        let notifier = NotifierService::new(database.clone(), realtime.clone(), mailer.clone());
        let lifecycle = EventLifecycleService::new(database.clone(), notifier.clone());
        let registration = RegistrationService::new(
            database.clone(),
            notifier.clone(),
            settings.registration.clone(),
        );
        let tasks = TaskService::new(database.clone(), notifier.clone());
        let summaries = SummaryService::new(database.clone(), notifier.clone());

        Ok(Self {
            database,
            lifecycle,
            registration,
            tasks,
            summaries,
            notifier,
            mailer,
            realtime,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let (database, redis, mailer) = futures::join!(
            self.database.health_check(),
            self.realtime.health_check(),
            self.mailer.health_check(),
        );

        ServiceHealthStatus {
            database_healthy: database.is_ok(),
            redis_healthy: redis.unwrap_or(false),
            mailer_healthy: mailer.unwrap_or(false),
            mailer_enabled: self.mailer.is_enabled(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
    pub mailer_healthy: bool,
    pub mailer_enabled: bool,
}

impl ServiceHealthStatus {
    /// Check if the critical services are healthy
    ///
    /// Redis and the mail gateway are best-effort delivery channels; only
    /// the store is critical.
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }
        if self.mailer_enabled && !self.mailer_healthy {
            issues.push("Mail gateway unreachable".to_string());
        }

        issues
    }
}
