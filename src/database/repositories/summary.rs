//! Event summary repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::summary::{CreateSummaryRequest, EventSummary};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct SummaryRepository {
    pool: PgPool,
}

impl SummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a summary behind the single-publication gate
    ///
    /// The event's `summary_published` flag is flipped with an update
    /// conditional on the event being completed and unpublished; the
    /// summary row is inserted in the same transaction. Concurrent
    /// submissions therefore produce exactly one summary, and all
    /// losers learn why they lost.
    pub async fn create_gated(
        &self,
        event_id: i64,
        organiser_id: i64,
        request: CreateSummaryRequest,
    ) -> Result<EventSummary, VolunteerHubError> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE events SET summary_published = TRUE, updated_at = $2 WHERE id = $1 AND lifecycle_state = 'completed' AND summary_published = FALSE"
        )
        .bind(event_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            let row: Option<(String, bool)> = sqlx::query_as(
                "SELECT lifecycle_state, summary_published FROM events WHERE id = $1",
            )
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Err(match row {
                None => VolunteerHubError::EventNotFound { event_id },
                Some((_, true)) => VolunteerHubError::SummaryAlreadyPublished { event_id },
                Some((state, false)) => VolunteerHubError::InvalidStateTransition {
                    from: state,
                    to: "completed".to_string(),
                },
            });
        }

        let summary = sqlx::query_as::<_, EventSummary>(
            r#"
            INSERT INTO event_summaries (event_id, organiser_id, headline, body, attendance_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, event_id, organiser_id, headline, body, attendance_count, created_at
            "#,
        )
        .bind(event_id)
        .bind(organiser_id)
        .bind(request.headline)
        .bind(request.body)
        .bind(request.attendance_count)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(summary)
    }

    /// Get the summary of an event
    pub async fn get_by_event(
        &self,
        event_id: i64,
    ) -> Result<Option<EventSummary>, VolunteerHubError> {
        let summary = sqlx::query_as::<_, EventSummary>(
            "SELECT id, event_id, organiser_id, headline, body, attendance_count, created_at FROM event_summaries WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }
}
