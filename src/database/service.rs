//! Database service layer
//!
//! This module bundles the repositories behind a single handle that the
//! service layer clones what it needs out of.

use crate::database::{
    connection, CapacityLedger, DatabasePool, EventRepository, FeedbackRepository,
    NotificationRepository, SummaryRepository, TaskRepository, UserRepository,
};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub events: EventRepository,
    pub capacity: CapacityLedger,
    pub tasks: TaskRepository,
    pub summaries: SummaryRepository,
    pub feedback: FeedbackRepository,
    pub notifications: NotificationRepository,
    pub users: UserRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            capacity: CapacityLedger::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            summaries: SummaryRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), VolunteerHubError> {
        connection::health_check(&self.pool).await
    }

    /// Get system statistics
    pub async fn get_system_stats(&self) -> Result<serde_json::Value, VolunteerHubError> {
        let event_counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT lifecycle_state, COUNT(*) FROM events GROUP BY lifecycle_state")
                .fetch_all(&self.pool)
                .await?;
        let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let unread_notifications: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE is_read = FALSE")
                .fetch_one(&self.pool)
                .await?;

        let mut events = serde_json::Map::new();
        for (state, count) in event_counts {
            events.insert(state, serde_json::json!(count));
        }

        Ok(serde_json::json!({
            "events": events,
            "users": user_count.0,
            "unread_notifications": unread_notifications.0,
        }))
    }
}
