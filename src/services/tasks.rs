//! Task service implementation
//!
//! This service enforces the assignment guard: tasks go only to users
//! holding an active registration on the event, status updates are
//! restricted to the assignee, and the proof workflow routes review
//! through the event creator.

use tracing::{debug, info, warn};

use crate::database::DatabaseService;
use crate::models::event::Event;
use crate::models::task::{AssignTasksRequest, SubmitProofRequest, Task, TaskStatus};
use crate::services::notifier::NotifierService;
use crate::utils::errors::{Result, VolunteerHubError};
use crate::utils::logging::log_task_action;

/// Task service with eligibility and ownership checks
#[derive(Clone)]
pub struct TaskService {
    database: DatabaseService,
    notifier: NotifierService,
}

impl TaskService {
    /// Create a new TaskService instance
    pub fn new(database: DatabaseService, notifier: NotifierService) -> Self {
        Self { database, notifier }
    }

    /// Assign tasks to a registered volunteer
    pub async fn assign_tasks(&self, request: AssignTasksRequest) -> Result<Vec<Task>> {
        let AssignTasksRequest {
            event_id,
            volunteer_id,
            descriptions,
        } = request;

        debug!(event_id = event_id, volunteer_id = volunteer_id, "Assigning tasks");

        let event = self.load_event(event_id).await?;

        let eligible = self.database.capacity.is_volunteer(event_id, volunteer_id).await?;
        if !eligible {
            return Err(VolunteerHubError::NotEligible {
                event_id,
                user_id: volunteer_id,
            });
        }

        let valid = sanitize_descriptions(&descriptions);
        if valid.is_empty() {
            return Err(VolunteerHubError::Validation(
                "Please provide at least one valid task description.".to_string(),
            ));
        }

        let mut tasks = Vec::with_capacity(valid.len());
        for description in &valid {
            let task = self.database.tasks.create(event_id, volunteer_id, description).await?;
            log_task_action(task.id, "assigned", volunteer_id);
            tasks.push(task);
        }

        info!(event_id = event_id, volunteer_id = volunteer_id, count = tasks.len(), "Tasks assigned");

        if let Err(e) = self.notifier.notify_tasks_assigned(&event, volunteer_id).await {
            warn!(event_id = event_id, volunteer_id = volunteer_id, error = %e, "Failed to notify volunteer about assignment");
        }

        Ok(tasks)
    }

    /// Update a task's status, assignee-only
    ///
    /// The two-state machine toggles freely in both directions. The
    /// creator notification fires only on the pending-to-completed edge.
    pub async fn update_task_status(
        &self,
        task_id: i64,
        status: TaskStatus,
        caller_id: i64,
    ) -> Result<Task> {
        let task = self.load_task(task_id).await?;
        self.require_assignee(&task, caller_id)?;

        let previous = task.task_status()?;

        let updated = self
            .database
            .tasks
            .update_status(task_id, status)
            .await?
            .ok_or(VolunteerHubError::TaskNotFound { task_id })?;

        log_task_action(task_id, "status_updated", caller_id);

        if previous == TaskStatus::Pending && status == TaskStatus::Completed {
            match self.load_event(updated.event_id).await {
                Ok(event) => {
                    if let Err(e) = self.notifier.notify_task_completed(&event, &updated).await {
                        warn!(task_id = task_id, error = %e, "Failed to notify creator about task completion");
                    }
                }
                Err(e) => {
                    warn!(task_id = task_id, error = %e, "Could not load event for completion notification");
                }
            }
        }

        Ok(updated)
    }

    /// Submit proof of completion for a task, assignee-only
    pub async fn submit_proof(
        &self,
        task_id: i64,
        caller_id: i64,
        request: SubmitProofRequest,
    ) -> Result<Task> {
        let task = self.load_task(task_id).await?;
        self.require_assignee(&task, caller_id)?;

        if request.message.trim().is_empty() && request.images.is_empty() {
            return Err(VolunteerHubError::Validation(
                "Proof must include a message or at least one image".to_string(),
            ));
        }

        let updated = self
            .database
            .tasks
            .set_proof(task_id, &request.message, &request.images)
            .await?;

        let Some(updated) = updated else {
            // Zero rows: the task vanished or proof is already attached
            self.load_task(task_id).await?;
            return Err(VolunteerHubError::Conflict(
                "Proof already submitted for this task".to_string(),
            ));
        };

        log_task_action(task_id, "proof_submitted", caller_id);

        match self.load_event(updated.event_id).await {
            Ok(event) => {
                if let Err(e) = self.notifier.notify_proof_submitted(&event, &updated).await {
                    warn!(task_id = task_id, error = %e, "Failed to notify creator about proof submission");
                }
            }
            Err(e) => {
                warn!(task_id = task_id, error = %e, "Could not load event for proof notification");
            }
        }

        Ok(updated)
    }

    /// Review submitted proof, event-creator-only
    ///
    /// Approval marks the task completed; rejection clears the proof so
    /// the assignee can resubmit, leaving the task pending.
    pub async fn review_proof(&self, task_id: i64, reviewer_id: i64, approve: bool) -> Result<Task> {
        let task = self.load_task(task_id).await?;
        let event = self.load_event(task.event_id).await?;

        if event.created_by != reviewer_id {
            return Err(VolunteerHubError::NotEligible {
                event_id: event.id,
                user_id: reviewer_id,
            });
        }

        if !task.proof_submitted {
            return Err(VolunteerHubError::Validation(
                "No proof has been submitted for this task".to_string(),
            ));
        }

        let updated = if approve {
            let updated = self
                .database
                .tasks
                .update_status(task_id, TaskStatus::Completed)
                .await?
                .ok_or(VolunteerHubError::TaskNotFound { task_id })?;
            log_task_action(task_id, "proof_approved", reviewer_id);
            updated
        } else {
            let updated = self
                .database
                .tasks
                .clear_proof(task_id)
                .await?
                .ok_or(VolunteerHubError::TaskNotFound { task_id })?;
            log_task_action(task_id, "proof_rejected", reviewer_id);
            updated
        };

        if let Err(e) = self.notifier.notify_proof_reviewed(&updated, approve).await {
            warn!(task_id = task_id, error = %e, "Failed to notify assignee about proof review");
        }

        Ok(updated)
    }

    /// All tasks of an event
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Task>> {
        self.load_event(event_id).await?;
        self.database.tasks.list_for_event(event_id).await
    }

    /// One volunteer's tasks on an event
    pub async fn list_for_volunteer(&self, event_id: i64, volunteer_id: i64) -> Result<Vec<Task>> {
        self.load_event(event_id).await?;
        self.database.tasks.list_for_volunteer(event_id, volunteer_id).await
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })
    }

    async fn load_task(&self, task_id: i64) -> Result<Task> {
        self.database
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(VolunteerHubError::TaskNotFound { task_id })
    }

    fn require_assignee(&self, task: &Task, caller_id: i64) -> Result<()> {
        if task.assigned_to != caller_id {
            return Err(VolunteerHubError::NotEligible {
                event_id: task.event_id,
                user_id: caller_id,
            });
        }
        Ok(())
    }
}

/// Trim descriptions and drop the empty ones
fn sanitize_descriptions(descriptions: &[String]) -> Vec<String> {
    descriptions
        .iter()
        .map(|description| description.trim().to_string())
        .filter(|description| !description.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_descriptions_drops_empty_entries() {
        let descriptions = vec![
            "  Set up chairs  ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "Hand out water".to_string(),
        ];

        let valid = sanitize_descriptions(&descriptions);
        assert_eq!(valid, vec!["Set up chairs".to_string(), "Hand out water".to_string()]);
    }

    #[test]
    fn test_sanitize_descriptions_empty_input() {
        assert!(sanitize_descriptions(&[]).is_empty());
        assert!(sanitize_descriptions(&["  ".to_string()]).is_empty());
    }
}
