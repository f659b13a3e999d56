//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::VolunteerHubError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Category of a persisted notification
///
/// The wire strings are part of the stored data and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Registration,
    Reminder,
    Feedback,
    TaskAssigned,
    TaskComplete,
    EventEnd,
    Warning,
    RoleChange,
}

impl NotificationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Registration => "registration",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Feedback => "feedback",
            NotificationKind::TaskAssigned => "task-assigned",
            NotificationKind::TaskComplete => "task-complete",
            NotificationKind::EventEnd => "event-end",
            NotificationKind::Warning => "warning",
            NotificationKind::RoleChange => "role_change",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = VolunteerHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(NotificationKind::Registration),
            "reminder" => Ok(NotificationKind::Reminder),
            "feedback" => Ok(NotificationKind::Feedback),
            "task-assigned" => Ok(NotificationKind::TaskAssigned),
            "task-complete" => Ok(NotificationKind::TaskComplete),
            "event-end" => Ok(NotificationKind::EventEnd),
            "warning" => Ok(NotificationKind::Warning),
            "role_change" => Ok(NotificationKind::RoleChange),
            other => Err(VolunteerHubError::Validation(format!(
                "Unknown notification kind: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_strings() {
        assert_eq!(NotificationKind::TaskAssigned.as_str(), "task-assigned");
        assert_eq!(NotificationKind::EventEnd.as_str(), "event-end");
        assert_eq!(NotificationKind::RoleChange.as_str(), "role_change");

        for kind in [
            NotificationKind::Registration,
            NotificationKind::Reminder,
            NotificationKind::Feedback,
            NotificationKind::TaskAssigned,
            NotificationKind::TaskComplete,
            NotificationKind::EventEnd,
            NotificationKind::Warning,
            NotificationKind::RoleChange,
        ] {
            let parsed: NotificationKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
