//! Event summary and feedback models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post-event report written by the organiser
///
/// At most one summary exists per event. The write is gated on the
/// event's `summary_published` flag flipping in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSummary {
    pub id: i64,
    pub event_id: i64,
    pub organiser_id: i64,
    pub headline: String,
    pub body: String,
    pub attendance_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSummaryRequest {
    pub headline: String,
    pub body: String,
    pub attendance_count: i32,
}

/// Anonymous feedback left on a completed event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedbackRequest {
    pub rating: i32,
    pub comment: Option<String>,
}
