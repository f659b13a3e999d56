//! Event lifecycle service implementation
//!
//! This service owns the event state machine: submission into the pending
//! state, admin approval and rejection, the scheduled completion sweep,
//! and the notification fan-out each transition triggers.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::database::DatabaseService;
use crate::models::event::{
    CreateEventRequest, Event, EventDetail, EventFilter, LifecycleState, UpdateEventRequest,
    VolunteeringPosition,
};
use crate::services::notifier::NotifierService;
use crate::utils::errors::{Result, VolunteerHubError};
use crate::utils::helpers::slugify;
use crate::utils::logging::{log_lifecycle_transition, log_sweep_result};

/// Upper bound on slug dedup attempts before giving up
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Event lifecycle service for state transitions and event CRUD
#[derive(Clone)]
pub struct EventLifecycleService {
    database: DatabaseService,
    notifier: NotifierService,
}

impl EventLifecycleService {
    /// Create a new EventLifecycleService instance
    pub fn new(database: DatabaseService, notifier: NotifierService) -> Self {
        Self { database, notifier }
    }

    /// Submit a new event in the pending state
    pub async fn submit(&self, request: CreateEventRequest, creator_id: i64) -> Result<EventDetail> {
        debug!(creator_id = creator_id, title = %request.title, "Submitting event");

        validate_submission(&request)?;

        self.database
            .users
            .find_by_id(creator_id)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: creator_id })?;

        let slug = self.unique_slug(&request.title, None).await?;
        let detail = self.database.events.create(request, &slug, creator_id).await?;

        info!(event_id = detail.event.id, slug = %slug, creator_id = creator_id, "Event submitted");
        Ok(detail)
    }

    /// Approve a pending event and fan out the area notification
    pub async fn approve(&self, event_id: i64) -> Result<Event> {
        debug!(event_id = event_id, "Approving event");

        let event = self
            .database
            .events
            .transition_state(event_id, LifecycleState::Pending, LifecycleState::Approved)
            .await?;

        let event = match event {
            Some(event) => event,
            None => {
                // Zero rows means the event is absent or not pending
                let existing = self
                    .database
                    .events
                    .find_by_id(event_id)
                    .await?
                    .ok_or(VolunteerHubError::EventNotFound { event_id })?;
                return Err(VolunteerHubError::InvalidStateTransition {
                    from: existing.lifecycle_state,
                    to: LifecycleState::Approved.to_string(),
                });
            }
        };

        log_lifecycle_transition(event.id, LifecycleState::Pending.as_str(), LifecycleState::Approved.as_str());

        // Area fan-out is best-effort and never fails the approval
        match self
            .database
            .users
            .find_by_location_excluding(&event.location, event.created_by)
            .await
        {
            Ok(recipients) => {
                if let Err(e) = self.notifier.notify_event_listed(&recipients, &event).await {
                    warn!(event_id = event.id, error = %e, "Area fan-out failed");
                }
            }
            Err(e) => {
                warn!(event_id = event.id, error = %e, "Could not load area recipients");
            }
        }

        Ok(event)
    }

    /// Reject a pending event
    ///
    /// Rejection is a hard delete; positions cascade with the event. The
    /// returned snapshot is the state of the event before removal.
    pub async fn reject(&self, event_id: i64) -> Result<Event> {
        debug!(event_id = event_id, "Rejecting event");

        let event = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })?;

        let state = event.lifecycle()?;
        if !state.can_transition_to(LifecycleState::Rejected) {
            return Err(VolunteerHubError::InvalidStateTransition {
                from: state.to_string(),
                to: LifecycleState::Rejected.to_string(),
            });
        }

        self.database.events.delete(event_id).await?;
        log_lifecycle_transition(event_id, state.as_str(), LifecycleState::Rejected.as_str());

        if let Err(e) = self.notifier.notify_event_rejected(&event).await {
            warn!(event_id = event_id, error = %e, "Failed to notify creator about rejection");
        }

        Ok(event)
    }

    /// Sweep approved events whose end date has passed
    ///
    /// Selection is by date alone; slot occupancy plays no part. Each
    /// transition is a conditional update keyed on the approved state, so
    /// overlapping sweeps complete an event exactly once and the fan-out
    /// fires only from the sweep that performed the transition.
    pub async fn sweep_completions(&self, now: DateTime<Utc>) -> Result<u64> {
        let candidates = self.database.events.completion_candidates(now).await?;
        let mut transitioned = 0u64;

        for candidate in &candidates {
            let completed = self
                .database
                .events
                .transition_state(candidate.id, LifecycleState::Approved, LifecycleState::Completed)
                .await?;

            let Some(event) = completed else {
                debug!(event_id = candidate.id, "Event already transitioned by a concurrent sweep");
                continue;
            };

            transitioned += 1;
            log_lifecycle_transition(event.id, LifecycleState::Approved.as_str(), LifecycleState::Completed.as_str());

            if let Err(e) = self.notifier.notify_event_completed(&event).await {
                warn!(event_id = event.id, error = %e, "Completion fan-out failed");
            }
        }

        log_sweep_result(candidates.len(), transitioned);
        Ok(transitioned)
    }

    /// Get an event together with its positions
    pub async fn get(&self, event_id: i64) -> Result<EventDetail> {
        let event = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })?;
        let positions = self.database.events.positions_for_event(event_id).await?;

        Ok(EventDetail { event, positions })
    }

    /// Get an event by its slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<EventDetail> {
        let event = self
            .database
            .events
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| VolunteerHubError::EventSlugNotFound { slug: slug.to_string() })?;
        let positions = self.database.events.positions_for_event(event.id).await?;

        Ok(EventDetail { event, positions })
    }

    /// List events matching the filter
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.database.events.list(filter).await
    }

    /// Update event fields, recomputing the slug when the title changes
    pub async fn update(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        debug!(event_id = event_id, "Updating event");

        let existing = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })?;

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(VolunteerHubError::Validation(
                    "Event title is required".to_string(),
                ));
            }
        }

        let start = request.start_date.unwrap_or(existing.start_date);
        let end = request.end_date.unwrap_or(existing.end_date);
        if start > end {
            return Err(VolunteerHubError::Validation(
                "Event start date must not be after its end date".to_string(),
            ));
        }

        let slug = match &request.title {
            Some(title) if *title != existing.title => {
                Some(self.unique_slug(title, Some(event_id)).await?)
            }
            _ => None,
        };

        let event = self
            .database
            .events
            .update(event_id, request, slug)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })?;

        info!(event_id = event.id, slug = %event.slug, "Event updated");
        Ok(event)
    }

    /// Resize a position, refusing to shrink below its current roster
    pub async fn update_position_slots(
        &self,
        event_id: i64,
        position_id: i64,
        total_slots: i32,
    ) -> Result<VolunteeringPosition> {
        if total_slots < 0 {
            return Err(VolunteerHubError::Validation(
                "Slot count must not be negative".to_string(),
            ));
        }

        match self
            .database
            .events
            .update_position_slots(event_id, position_id, total_slots)
            .await?
        {
            Some(position) => {
                info!(event_id = event_id, position_id = position_id, total_slots = total_slots, "Position resized");
                Ok(position)
            }
            None => {
                // Zero rows is either a missing position or a shrink below roster
                let position = self
                    .database
                    .events
                    .find_position(event_id, position_id)
                    .await?
                    .ok_or(VolunteerHubError::PositionNotFound { event_id, position_id })?;
                Err(VolunteerHubError::Validation(format!(
                    "Cannot shrink \"{}\" below its {} registered volunteers",
                    position.title,
                    position.registered_users.len()
                )))
            }
        }
    }

    /// Delete an event outright, cascading its positions and tasks
    pub async fn delete(&self, event_id: i64) -> Result<()> {
        let deleted = self.database.events.delete(event_id).await?;
        if !deleted {
            return Err(VolunteerHubError::EventNotFound { event_id });
        }

        info!(event_id = event_id, "Event deleted");
        Ok(())
    }

    /// Derive a unique slug, suffixing -2, -3, ... on collision
    async fn unique_slug(&self, title: &str, exclude_event: Option<i64>) -> Result<String> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(VolunteerHubError::Validation(
                "Event title must contain at least one alphanumeric character".to_string(),
            ));
        }

        if !self.database.events.slug_exists(&base, exclude_event).await? {
            return Ok(base);
        }

        for n in 2..=MAX_SLUG_ATTEMPTS {
            let candidate = format!("{}-{}", base, n);
            if !self.database.events.slug_exists(&candidate, exclude_event).await? {
                return Ok(candidate);
            }
        }

        Err(VolunteerHubError::Conflict(format!(
            "Could not find a free slug for title: {}",
            title
        )))
    }
}

/// Validate a submission request before touching the store
fn validate_submission(request: &CreateEventRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(VolunteerHubError::Validation(
            "Event title is required".to_string(),
        ));
    }
    if request.location.trim().is_empty() {
        return Err(VolunteerHubError::Validation(
            "Event location is required".to_string(),
        ));
    }
    if request.start_date > request.end_date {
        return Err(VolunteerHubError::Validation(
            "Event start date must not be after its end date".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for position in &request.positions {
        let title = position.title.trim();
        if title.is_empty() {
            return Err(VolunteerHubError::Validation(
                "Position title is required".to_string(),
            ));
        }
        if position.total_slots < 0 {
            return Err(VolunteerHubError::Validation(format!(
                "Position \"{}\" has a negative slot count",
                title
            )));
        }
        if !seen.insert(title.to_lowercase()) {
            return Err(VolunteerHubError::Validation(format!(
                "Duplicate position title: {}",
                title
            )));
        }
    }

    Ok(())
}
