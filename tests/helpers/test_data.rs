//! Test data helpers for creating request fixtures

use chrono::{Duration, Utc};
use fake::faker::name::en::Name;
use fake::Fake;

use VolunteerHub::models::{CreateEventRequest, CreatePositionRequest};

/// Random display name for fixture users
pub fn fake_name() -> String {
    Name().fake()
}

/// Event request with the given positions, scheduled a week out
pub fn event_request(
    title: &str,
    location: &str,
    positions: &[(&str, i32)],
) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: format!("{} needs volunteers", title),
        location: location.to_string(),
        start_date: Utc::now() + Duration::days(7),
        end_date: Utc::now() + Duration::days(8),
        positions: positions
            .iter()
            .map(|(title, total_slots)| CreatePositionRequest {
                title: title.to_string(),
                total_slots: *total_slots,
            })
            .collect(),
    }
}

/// Event request whose dates already lie in the past
///
/// Useful for driving the completion sweep without waiting.
pub fn elapsed_event_request(
    title: &str,
    location: &str,
    positions: &[(&str, i32)],
) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: format!("{} has already taken place", title),
        location: location.to_string(),
        start_date: Utc::now() - Duration::days(3),
        end_date: Utc::now() - Duration::days(1),
        positions: positions
            .iter()
            .map(|(title, total_slots)| CreatePositionRequest {
                title: title.to_string(),
                total_slots: *total_slots,
            })
            .collect(),
    }
}
