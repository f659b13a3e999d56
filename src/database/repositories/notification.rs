//! Notification repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::notification::{Notification, NotificationKind};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a notification for a user
    pub async fn create(
        &self,
        user_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, VolunteerHubError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message, kind, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, message, kind, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(kind.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Get notifications for a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, VolunteerHubError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, message, kind, is_read, created_at FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Count unread notifications for a user
    pub async fn unread_count(&self, user_id: i64) -> Result<i64, VolunteerHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Mark one notification as read; the owner check is part of the update
    pub async fn mark_read(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Notification>, VolunteerHubError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, message, kind, is_read, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Mark all notifications of a user as read, returning how many changed
    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, VolunteerHubError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Delete one notification owned by the user
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, VolunteerHubError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
