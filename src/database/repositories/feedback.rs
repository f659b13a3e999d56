//! Feedback repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::summary::{CreateFeedbackRequest, Feedback};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record feedback for an event
    pub async fn create(
        &self,
        event_id: i64,
        user_id: i64,
        request: CreateFeedbackRequest,
    ) -> Result<Feedback, VolunteerHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (event_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(request.rating)
        .bind(request.comment)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Get feedback for an event, newest first
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Feedback>, VolunteerHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            "SELECT id, event_id, user_id, rating, comment, created_at FROM feedback WHERE event_id = $1 ORDER BY created_at DESC, id DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }
}
