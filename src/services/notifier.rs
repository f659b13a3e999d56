//! Notification fan-out service implementation
//!
//! This service handles message formatting, persisted notification
//! creation, realtime publishing and best-effort email delivery. It owns
//! the message templating system and the bulk fan-out used by lifecycle
//! transitions and registrations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::{Event, Notification, NotificationKind, Task, User};
use crate::services::mailer::MailerService;
use crate::services::realtime::RealtimeService;
use crate::utils::errors::{Result, VolunteerHubError};
use crate::utils::logging::log_fan_out;

/// Message template structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub key: String,
    pub content: String,
}

/// Outcome of a bulk fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutStats {
    pub sent: u64,
    pub failed: u64,
}

impl FanOutStats {
    fn record_success(&mut self) {
        self.sent += 1;
    }

    fn record_failure(&mut self) {
        self.failed += 1;
    }
}

/// Notification service for persisted, realtime and email delivery
#[derive(Clone)]
pub struct NotifierService {
    database: DatabaseService,
    realtime: RealtimeService,
    mailer: MailerService,
    templates: HashMap<String, MessageTemplate>,
}

impl NotifierService {
    /// Create a new NotifierService instance
    pub fn new(database: DatabaseService, realtime: RealtimeService, mailer: MailerService) -> Self {
        let templates = Self::load_default_templates();

        Self {
            database,
            realtime,
            mailer,
            templates,
        }
    }

    /// Persist a notification and push it over the realtime channel
    ///
    /// The realtime push is best-effort; a publish failure is logged and
    /// the persisted notification is still returned.
    pub async fn notify(
        &self,
        user_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification> {
        let notification = self.database.notifications.create(user_id, kind, message).await?;

        if let Err(e) = self.realtime.publish_notification(user_id, &notification).await {
            warn!(user_id = user_id, error = %e, "Failed to publish notification to realtime channel");
        }

        debug!(user_id = user_id, kind = %kind, "Notification created");
        Ok(notification)
    }

    /// Notify a user and additionally send an email
    ///
    /// Email delivery is best-effort and never fails the notification.
    pub async fn notify_with_email(
        &self,
        user: &User,
        kind: NotificationKind,
        message: &str,
        subject: &str,
        html: &str,
    ) -> Result<Notification> {
        let notification = self.notify(user.id, kind, message).await?;

        if let Err(e) = self.mailer.send(&user.email, subject, html).await {
            warn!(user_id = user.id, error = %e, "Failed to send notification email");
        }

        Ok(notification)
    }

    /// Fan a notification out to many recipients
    ///
    /// Per-recipient failures are logged and counted, never propagated.
    pub async fn fan_out(
        &self,
        recipients: &[User],
        kind: NotificationKind,
        message: &str,
    ) -> FanOutStats {
        let batch_id = Uuid::new_v4();
        let mut stats = FanOutStats { sent: 0, failed: 0 };

        for user in recipients {
            match self.notify(user.id, kind, message).await {
                Ok(_) => stats.record_success(),
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "Failed to deliver fan-out notification");
                    stats.record_failure();
                }
            }

            // Small delay between recipients to avoid hammering the store
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        log_fan_out(&batch_id.to_string(), kind.as_str(), stats.sent, stats.failed);
        stats
    }

    /// Fan a notification out with an accompanying email per recipient
    pub async fn fan_out_with_email(
        &self,
        recipients: &[User],
        kind: NotificationKind,
        message: &str,
        subject: &str,
        html: &str,
    ) -> FanOutStats {
        let batch_id = Uuid::new_v4();
        let mut stats = FanOutStats { sent: 0, failed: 0 };

        for user in recipients {
            match self.notify_with_email(user, kind, message, subject, html).await {
                Ok(_) => stats.record_success(),
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "Failed to deliver fan-out notification");
                    stats.record_failure();
                }
            }

            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        log_fan_out(&batch_id.to_string(), kind.as_str(), stats.sent, stats.failed);
        stats
    }

    /// Notify area users that a newly approved event is listed
    pub async fn notify_event_listed(&self, recipients: &[User], event: &Event) -> Result<FanOutStats> {
        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());

        let message = self.render("event_listed", &parameters)?;
        let stats = self.fan_out(recipients, NotificationKind::Reminder, &message).await;

        info!(event_id = event.id, recipients = recipients.len(), "Area fan-out completed");
        Ok(stats)
    }

    /// Notify the event creator that a volunteer registered
    pub async fn notify_volunteer_registered(&self, event: &Event, volunteer_id: i64) -> Result<Notification> {
        let volunteer = self
            .database
            .users
            .find_by_id(volunteer_id)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: volunteer_id })?;
        let creator = self
            .database
            .users
            .find_by_id(event.created_by)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: event.created_by })?;

        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());
        parameters.insert("volunteer_name".to_string(), volunteer.name.clone());

        let message = self.render("volunteer_registered", &parameters)?;
        let subject = format!("New volunteer for \"{}\"", event.title);
        let html = registration_email_html(&volunteer.name, &event.title);

        self.notify_with_email(&creator, NotificationKind::Registration, &message, &subject, &html)
            .await
    }

    /// Notify the creator that their event was rejected and removed
    pub async fn notify_event_rejected(&self, event: &Event) -> Result<Notification> {
        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());

        let message = self.render("event_rejected", &parameters)?;
        self.notify(event.created_by, NotificationKind::Warning, &message).await
    }

    /// Notify every registered volunteer that an event has completed
    pub async fn notify_event_completed(&self, event: &Event) -> Result<FanOutStats> {
        let volunteers = self.database.users.find_by_ids(&event.registered_volunteers).await?;

        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());

        let message = self.render("event_completed", &parameters)?;
        let subject = format!("Thank you for supporting \"{}\"", event.title);
        let html = completion_email_html(&event.title);

        let stats = self
            .fan_out_with_email(&volunteers, NotificationKind::EventEnd, &message, &subject, &html)
            .await;

        info!(event_id = event.id, volunteers = volunteers.len(), "Completion fan-out finished");
        Ok(stats)
    }

    /// Notify a volunteer about newly assigned tasks
    pub async fn notify_tasks_assigned(&self, event: &Event, volunteer_id: i64) -> Result<Notification> {
        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());

        let message = self.render("tasks_assigned", &parameters)?;
        self.notify(volunteer_id, NotificationKind::TaskAssigned, &message).await
    }

    /// Notify the event creator that a task was marked completed
    pub async fn notify_task_completed(&self, event: &Event, task: &Task) -> Result<Notification> {
        let volunteer = self
            .database
            .users
            .find_by_id(task.assigned_to)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: task.assigned_to })?;

        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());
        parameters.insert("task_description".to_string(), task.description.clone());
        parameters.insert("volunteer_name".to_string(), volunteer.name.clone());

        let message = self.render("task_completed", &parameters)?;
        self.notify(event.created_by, NotificationKind::TaskComplete, &message).await
    }

    /// Notify the event creator that proof was submitted for review
    pub async fn notify_proof_submitted(&self, event: &Event, task: &Task) -> Result<Notification> {
        let volunteer = self
            .database
            .users
            .find_by_id(task.assigned_to)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id: task.assigned_to })?;

        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());
        parameters.insert("task_description".to_string(), task.description.clone());
        parameters.insert("volunteer_name".to_string(), volunteer.name.clone());

        let message = self.render("proof_submitted", &parameters)?;
        self.notify(event.created_by, NotificationKind::TaskComplete, &message).await
    }

    /// Notify the assignee about the outcome of a proof review
    pub async fn notify_proof_reviewed(&self, task: &Task, approved: bool) -> Result<Notification> {
        let mut parameters = HashMap::new();
        parameters.insert("task_description".to_string(), task.description.clone());

        if approved {
            let message = self.render("proof_approved", &parameters)?;
            self.notify(task.assigned_to, NotificationKind::TaskComplete, &message).await
        } else {
            let message = self.render("proof_rejected", &parameters)?;
            self.notify(task.assigned_to, NotificationKind::Warning, &message).await
        }
    }

    /// Notify the event creator about newly submitted feedback
    pub async fn notify_feedback_received(&self, event: &Event) -> Result<Notification> {
        let mut parameters = HashMap::new();
        parameters.insert("event_title".to_string(), event.title.clone());

        let message = self.render("feedback_received", &parameters)?;
        self.notify(event.created_by, NotificationKind::Feedback, &message).await
    }

    /// Get a user's notifications, newest first
    pub async fn list_inbox(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<Notification>> {
        self.database.notifications.list_for_user(user_id, limit, offset).await
    }

    /// Count a user's unread notifications
    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        self.database.notifications.unread_count(user_id).await
    }

    /// Mark a single notification as read, ownership-checked
    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> Result<Notification> {
        self.database
            .notifications
            .mark_read(notification_id, user_id)
            .await?
            .ok_or(VolunteerHubError::NotificationNotFound { notification_id })
    }

    /// Mark all of a user's notifications as read
    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        self.database.notifications.mark_all_read(user_id).await
    }

    /// Delete a notification, ownership-checked
    pub async fn delete_notification(&self, notification_id: i64, user_id: i64) -> Result<()> {
        let deleted = self.database.notifications.delete(notification_id, user_id).await?;
        if !deleted {
            return Err(VolunteerHubError::NotificationNotFound { notification_id });
        }
        Ok(())
    }

    /// Format a message using a template and parameters
    fn render(&self, template_key: &str, parameters: &HashMap<String, String>) -> Result<String> {
        let template = self.templates.get(template_key).ok_or_else(|| {
            VolunteerHubError::Validation(format!("Template not found: {}", template_key))
        })?;

        let mut formatted = template.content.clone();

        for (key, value) in parameters {
            let placeholder = format!("{{{}}}", key);
            formatted = formatted.replace(&placeholder, value);
        }

        Ok(formatted)
    }

    /// Add or update a message template
    pub fn add_template(&mut self, template: MessageTemplate) {
        self.templates.insert(template.key.clone(), template);
    }

    /// Get available template keys
    pub fn template_keys(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        let defaults = [
            (
                "event_listed",
                "New event \"{event_title}\" is listed in your area.",
            ),
            (
                "volunteer_registered",
                "{volunteer_name} registered for your event \"{event_title}\".",
            ),
            (
                "event_rejected",
                "Your event \"{event_title}\" was rejected and has been removed.",
            ),
            (
                "event_completed",
                "Event \"{event_title}\" has ended. Thank you for volunteering!",
            ),
            (
                "tasks_assigned",
                "You have been assigned new tasks for event \"{event_title}\"",
            ),
            (
                "task_completed",
                "Task \"{task_description}\" for event \"{event_title}\" has been marked completed by \"{volunteer_name}\"",
            ),
            (
                "proof_submitted",
                "{volunteer_name} submitted proof for task \"{task_description}\" in event \"{event_title}\".",
            ),
            (
                "proof_approved",
                "Your proof for task \"{task_description}\" was approved. Task marked as completed.",
            ),
            (
                "proof_rejected",
                "Your proof for task \"{task_description}\" was rejected. Please submit new proof.",
            ),
            (
                "feedback_received",
                "A new anonymous feedback has been submitted for your event \"{event_title}\".",
            ),
        ];

        defaults
            .into_iter()
            .map(|(key, content)| {
                (
                    key.to_string(),
                    MessageTemplate {
                        key: key.to_string(),
                        content: content.to_string(),
                    },
                )
            })
            .collect()
    }
}

/// Email body for the registration notification to the event creator
fn registration_email_html(volunteer_name: &str, event_title: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif;\">\
         <h2>New Volunteer Registration</h2>\
         <p>A new volunteer has registered for your event <strong>{}</strong>.</p>\
         <p><strong>Volunteer name:</strong> {}</p>\
         <p>You can check your event dashboard for more details.</p>\
         </div>",
        event_title, volunteer_name
    )
}

/// Email body for the completion notification to registered volunteers
fn completion_email_html(event_title: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif;\">\
         <h2>Thank You for Your Support!</h2>\
         <p>The event <strong>{}</strong> has successfully concluded, and we sincerely \
         appreciate your contribution.</p>\
         <p>We invite you to fill the event feedback form with your honest thoughts.</p>\
         </div>",
        event_title
    )
}
