//! Event and volunteering position models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::VolunteerHubError;

/// Lifecycle state of an event
///
/// Events start out `Pending` and move through a one-way state machine:
/// an administrator approves or rejects them, and approved events are
/// completed by the daily sweep once their end date has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl LifecycleState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Approved => "approved",
            LifecycleState::Rejected => "rejected",
            LifecycleState::Completed => "completed",
        }
    }

    /// Check whether a transition to `target` is allowed
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        matches!(
            (self, target),
            (LifecycleState::Pending, LifecycleState::Approved)
                | (LifecycleState::Pending, LifecycleState::Rejected)
                | (LifecycleState::Approved, LifecycleState::Completed)
        )
    }

    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Rejected | LifecycleState::Completed)
    }

    /// Only approved events accept roster changes
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, LifecycleState::Approved)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = VolunteerHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LifecycleState::Pending),
            "approved" => Ok(LifecycleState::Approved),
            "rejected" => Ok(LifecycleState::Rejected),
            "completed" => Ok(LifecycleState::Completed),
            other => Err(VolunteerHubError::Validation(format!(
                "Unknown lifecycle state: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub location: String,
    pub lifecycle_state: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registered_volunteers: Vec<i64>,
    pub summary_published: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Parse the persisted lifecycle state
    pub fn lifecycle(&self) -> Result<LifecycleState, VolunteerHubError> {
        self.lifecycle_state.parse()
    }
}

/// A volunteering slot group within an event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteeringPosition {
    pub id: i64,
    pub event_id: i64,
    pub title: String,
    pub total_slots: i32,
    pub registered_users: Vec<i64>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VolunteeringPosition {
    pub fn available_slots(&self) -> i32 {
        self.total_slots - self.registered_users.len() as i32
    }

    pub fn is_full(&self) -> bool {
        self.registered_users.len() as i32 >= self.total_slots
    }
}

/// An event together with its ordered positions
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub positions: Vec<VolunteeringPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub positions: Vec<CreatePositionRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePositionRequest {
    pub title: String,
    pub total_slots: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Listing filter for events
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub created_by: Option<i64>,
    pub location: Option<String>,
    pub state: Option<LifecycleState>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            created_by: None,
            location: None,
            state: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use LifecycleState::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in [
            LifecycleState::Pending,
            LifecycleState::Approved,
            LifecycleState::Rejected,
            LifecycleState::Completed,
        ] {
            let parsed: LifecycleState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }

        assert!("unknown".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LifecycleState::Pending.is_terminal());
        assert!(!LifecycleState::Approved.is_terminal());
        assert!(LifecycleState::Rejected.is_terminal());
        assert!(LifecycleState::Completed.is_terminal());
    }

    #[test]
    fn test_registration_gate() {
        assert!(LifecycleState::Approved.accepts_registrations());
        assert!(!LifecycleState::Pending.accepts_registrations());
        assert!(!LifecycleState::Completed.accepts_registrations());
    }

    #[test]
    fn test_available_slots() {
        let position = VolunteeringPosition {
            id: 1,
            event_id: 1,
            title: "Stage crew".to_string(),
            total_slots: 3,
            registered_users: vec![10, 20],
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(position.available_slots(), 1);
        assert!(!position.is_full());

        let full = VolunteeringPosition {
            registered_users: vec![10, 20, 30],
            ..position
        };
        assert_eq!(full.available_slots(), 0);
        assert!(full.is_full());
    }
}
