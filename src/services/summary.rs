//! Summary and feedback service implementation
//!
//! This service guards the one-summary-per-event invariant and the
//! completed-only precondition for summaries and feedback. The atomic
//! flag-and-create lives in the repository; validation and the creator
//! notification live here.

use tracing::{debug, info, warn};

use crate::database::DatabaseService;
use crate::models::event::{Event, LifecycleState};
use crate::models::summary::{CreateFeedbackRequest, CreateSummaryRequest, EventSummary, Feedback};
use crate::services::notifier::NotifierService;
use crate::utils::errors::{Result, VolunteerHubError};

/// Summary service enforcing the completion gate
#[derive(Clone)]
pub struct SummaryService {
    database: DatabaseService,
    notifier: NotifierService,
}

impl SummaryService {
    /// Create a new SummaryService instance
    pub fn new(database: DatabaseService, notifier: NotifierService) -> Self {
        Self { database, notifier }
    }

    /// Publish the summary of a completed event, exactly once
    pub async fn submit_summary(
        &self,
        event_id: i64,
        organiser_id: i64,
        request: CreateSummaryRequest,
    ) -> Result<EventSummary> {
        debug!(event_id = event_id, organiser_id = organiser_id, "Submitting event summary");

        if request.headline.trim().is_empty() {
            return Err(VolunteerHubError::Validation(
                "Summary headline is required".to_string(),
            ));
        }
        if request.body.trim().is_empty() {
            return Err(VolunteerHubError::Validation(
                "Summary body is required".to_string(),
            ));
        }
        if request.attendance_count < 0 {
            return Err(VolunteerHubError::Validation(
                "Attendance count must not be negative".to_string(),
            ));
        }

        self.database
            .users
            .find_by_id(organiser_id)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: organiser_id })?;

        // The repository enforces the completed-and-unpublished gate
        // atomically; concurrent submissions leave exactly one summary.
        let summary = self
            .database
            .summaries
            .create_gated(event_id, organiser_id, request)
            .await?;

        info!(event_id = event_id, summary_id = summary.id, "Event summary published");
        Ok(summary)
    }

    /// Get the summary of an event, if one was published
    pub async fn get_summary(&self, event_id: i64) -> Result<Option<EventSummary>> {
        self.load_event(event_id).await?;
        self.database.summaries.get_by_event(event_id).await
    }

    /// Record feedback on a completed event
    pub async fn submit_feedback(
        &self,
        event_id: i64,
        user_id: i64,
        request: CreateFeedbackRequest,
    ) -> Result<Feedback> {
        debug!(event_id = event_id, user_id = user_id, "Submitting feedback");

        if !(1..=5).contains(&request.rating) {
            return Err(VolunteerHubError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let event = self.load_event(event_id).await?;
        let state = event.lifecycle()?;
        if state != LifecycleState::Completed {
            return Err(VolunteerHubError::InvalidStateTransition {
                from: state.to_string(),
                to: LifecycleState::Completed.to_string(),
            });
        }

        self.database
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id })?;

        let feedback = self.database.feedback.create(event_id, user_id, request).await?;

        info!(event_id = event_id, feedback_id = feedback.id, "Feedback recorded");

        // Feedback stays anonymous towards the creator
        if let Err(e) = self.notifier.notify_feedback_received(&event).await {
            warn!(event_id = event_id, error = %e, "Failed to notify creator about feedback");
        }

        Ok(feedback)
    }

    /// All feedback of an event, newest first
    pub async fn list_feedback(&self, event_id: i64) -> Result<Vec<Feedback>> {
        self.load_event(event_id).await?;
        self.database.feedback.list_for_event(event_id).await
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })
    }
}
