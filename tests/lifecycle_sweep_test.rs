//! Event lifecycle integration tests
//!
//! Covers the moderation transitions, the completion sweep, and the
//! notifications each transition produces.

mod helpers;

use assert_matches::assert_matches;
use chrono::Utc;
use serial_test::serial;

use helpers::{test_data, TestDatabase};
use VolunteerHub::models::{EventFilter, LifecycleState, NotificationKind};
use VolunteerHub::services::RegistrationOutcome;
use VolunteerHub::utils::errors::VolunteerHubError;

#[tokio::test]
#[serial]
async fn test_submitted_event_waits_for_approval() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create organizer");
    let neighbour = db
        .create_test_user(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create volunteer");

    let request = test_data::event_request("Beach Cleanup", "Chennai", &[("Collector", 5)]);
    let detail = services
        .lifecycle
        .submit(request, creator.id)
        .await
        .expect("Failed to submit event");
    assert_eq!(detail.event.lifecycle_state, LifecycleState::Pending.as_str());
    assert_eq!(detail.event.slug, "beach-cleanup");

    let approved = services
        .lifecycle
        .approve(detail.event.id)
        .await
        .expect("Failed to approve event");
    assert_eq!(approved.lifecycle_state, LifecycleState::Approved.as_str());

    // Listing announcements go to users in the event's area, not the creator
    let neighbour_inbox = services
        .notifier
        .list_inbox(neighbour.id, 10, 0)
        .await
        .expect("Failed to list inbox");
    assert_eq!(neighbour_inbox.len(), 1);
    assert_eq!(neighbour_inbox[0].kind, NotificationKind::Reminder.as_str());
    assert!(neighbour_inbox[0].message.contains("listed in your area"));

    let creator_inbox = services
        .notifier
        .list_inbox(creator.id, 10, 0)
        .await
        .expect("Failed to list inbox");
    assert!(creator_inbox.is_empty());
}

#[tokio::test]
#[serial]
async fn test_approve_is_single_shot() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Mumbai")
        .await
        .expect("Failed to create organizer");

    let request = test_data::event_request("Food Drive", "Mumbai", &[("Server", 3)]);
    let detail = services
        .lifecycle
        .submit(request, creator.id)
        .await
        .expect("Failed to submit event");

    services
        .lifecycle
        .approve(detail.event.id)
        .await
        .expect("First approval should succeed");

    let again = services.lifecycle.approve(detail.event.id).await;
    assert_matches!(
        again,
        Err(VolunteerHubError::InvalidStateTransition { ref from, .. }) if from == "approved"
    );
}

#[tokio::test]
#[serial]
async fn test_reject_removes_event_and_warns_creator() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Delhi")
        .await
        .expect("Failed to create organizer");

    let request = test_data::event_request("Charity Gala", "Delhi", &[("Greeter", 2)]);
    let detail = services
        .lifecycle
        .submit(request, creator.id)
        .await
        .expect("Failed to submit event");

    let rejected = services
        .lifecycle
        .reject(detail.event.id)
        .await
        .expect("Failed to reject event");
    assert_eq!(rejected.id, detail.event.id);

    let gone = services.lifecycle.get(detail.event.id).await;
    assert_matches!(gone, Err(VolunteerHubError::EventNotFound { .. }));

    let inbox = services
        .notifier
        .list_inbox(creator.id, 10, 0)
        .await
        .expect("Failed to list inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::Warning.as_str());
    assert!(inbox[0].message.contains("was rejected"));

    // An approved event can no longer be rejected
    let request = test_data::event_request("Art Fair", "Delhi", &[("Guide", 2)]);
    let detail = services
        .lifecycle
        .submit(request, creator.id)
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(detail.event.id)
        .await
        .expect("Failed to approve event");

    let too_late = services.lifecycle.reject(detail.event.id).await;
    assert_matches!(too_late, Err(VolunteerHubError::InvalidStateTransition { .. }));
}

#[tokio::test]
#[serial]
async fn test_sweep_completes_elapsed_events_exactly_once() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create organizer");
    let volunteer = db
        .create_test_user(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create volunteer");

    let request = test_data::elapsed_event_request("Marathon Support", "Chennai", &[("Pacer", 3)]);
    let detail = services
        .lifecycle
        .submit(request, creator.id)
        .await
        .expect("Failed to submit event");
    let event_id = detail.event.id;
    services
        .lifecycle
        .approve(event_id)
        .await
        .expect("Failed to approve event");

    let outcome = services
        .registration
        .register(event_id, volunteer.id, detail.positions[0].id)
        .await
        .expect("Registration should succeed");
    assert_matches!(outcome, RegistrationOutcome::Registered { .. });

    let swept = services
        .lifecycle
        .sweep_completions(Utc::now())
        .await
        .expect("Sweep should succeed");
    assert_eq!(swept, 1);

    let completed = services
        .lifecycle
        .get(event_id)
        .await
        .expect("Failed to load event");
    assert_eq!(
        completed.event.lifecycle_state,
        LifecycleState::Completed.as_str()
    );

    // Completed events are off the candidate list, so a second sweep is a no-op
    let again = services
        .lifecycle
        .sweep_completions(Utc::now())
        .await
        .expect("Second sweep should succeed");
    assert_eq!(again, 0);

    // Each registered volunteer is thanked once
    let inbox = services
        .notifier
        .list_inbox(volunteer.id, 10, 0)
        .await
        .expect("Failed to list inbox");
    let thanks: Vec<_> = inbox
        .iter()
        .filter(|n| n.kind == NotificationKind::EventEnd.as_str())
        .collect();
    assert_eq!(thanks.len(), 1);
    assert!(thanks[0].message.contains("Marathon Support"));
}

#[tokio::test]
#[serial]
async fn test_sweep_selects_by_date_alone() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Mumbai")
        .await
        .expect("Failed to create organizer");
    let volunteer = db
        .create_test_user(&test_data::fake_name(), "Mumbai")
        .await
        .expect("Failed to create volunteer");

    // One elapsed event with its only slot taken, one with nobody registered
    let full = services
        .lifecycle
        .submit(
            test_data::elapsed_event_request("Soup Kitchen", "Mumbai", &[("Cook", 1)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(full.event.id)
        .await
        .expect("Failed to approve event");
    services
        .registration
        .register(full.event.id, volunteer.id, full.positions[0].id)
        .await
        .expect("Registration should succeed");

    let empty = services
        .lifecycle
        .submit(
            test_data::elapsed_event_request("Book Sorting", "Mumbai", &[("Sorter", 4)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(empty.event.id)
        .await
        .expect("Failed to approve event");

    // A future event and an unapproved elapsed event must both be skipped
    let upcoming = services
        .lifecycle
        .submit(
            test_data::event_request("Harbour Watch", "Mumbai", &[("Watcher", 2)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(upcoming.event.id)
        .await
        .expect("Failed to approve event");

    let unapproved = services
        .lifecycle
        .submit(
            test_data::elapsed_event_request("Night Patrol", "Mumbai", &[("Patrol", 2)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");

    let swept = services
        .lifecycle
        .sweep_completions(Utc::now())
        .await
        .expect("Sweep should succeed");
    assert_eq!(swept, 2);

    for (event_id, expected) in [
        (full.event.id, LifecycleState::Completed),
        (empty.event.id, LifecycleState::Completed),
        (upcoming.event.id, LifecycleState::Approved),
        (unapproved.event.id, LifecycleState::Pending),
    ] {
        let detail = services
            .lifecycle
            .get(event_id)
            .await
            .expect("Failed to load event");
        assert_eq!(detail.event.lifecycle_state, expected.as_str());
    }
}

#[tokio::test]
#[serial]
async fn test_slugs_stay_unique_per_title() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Delhi")
        .await
        .expect("Failed to create organizer");

    let first = services
        .lifecycle
        .submit(
            test_data::event_request("Tree Planting!", "Delhi", &[("Planter", 3)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    assert_eq!(first.event.slug, "tree-planting");

    let second = services
        .lifecycle
        .submit(
            test_data::event_request("Tree Planting!", "Delhi", &[("Planter", 3)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    assert_eq!(second.event.slug, "tree-planting-2");

    let by_slug = services
        .lifecycle
        .get_by_slug("tree-planting-2")
        .await
        .expect("Failed to look up by slug");
    assert_eq!(by_slug.event.id, second.event.id);

    let missing = services.lifecycle.get_by_slug("tree-planting-9").await;
    assert_matches!(missing, Err(VolunteerHubError::EventSlugNotFound { .. }));
}

#[tokio::test]
#[serial]
async fn test_position_resize_respects_registrations() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Pune")
        .await
        .expect("Failed to create organizer");
    let alice = db
        .create_test_user(&test_data::fake_name(), "Pune")
        .await
        .expect("Failed to create volunteer");
    let bob = db
        .create_test_user(&test_data::fake_name(), "Pune")
        .await
        .expect("Failed to create volunteer");

    let detail = services
        .lifecycle
        .submit(
            test_data::event_request("River Cleanup", "Pune", &[("Diver", 3)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    let event_id = detail.event.id;
    let position_id = detail.positions[0].id;
    services
        .lifecycle
        .approve(event_id)
        .await
        .expect("Failed to approve event");

    for user in [&alice, &bob] {
        services
            .registration
            .register(event_id, user.id, position_id)
            .await
            .expect("Registration should succeed");
    }

    let too_small = services
        .lifecycle
        .update_position_slots(event_id, position_id, 1)
        .await;
    assert_matches!(too_small, Err(VolunteerHubError::Validation(_)));

    let resized = services
        .lifecycle
        .update_position_slots(event_id, position_id, 2)
        .await
        .expect("Shrinking to the registered count should work");
    assert_eq!(resized.total_slots, 2);
    assert!(resized.is_full());

    let grown = services
        .lifecycle
        .update_position_slots(event_id, position_id, 10)
        .await
        .expect("Growing should work");
    assert_eq!(grown.available_slots(), 8);
}

#[tokio::test]
#[serial]
async fn test_listing_filters() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let services = db.services();
    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Kochi")
        .await
        .expect("Failed to create organizer");
    let other = db
        .create_test_organizer(&test_data::fake_name(), "Goa")
        .await
        .expect("Failed to create organizer");

    let kochi = services
        .lifecycle
        .submit(
            test_data::event_request("Shore Watch", "Kochi", &[("Spotter", 2)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(kochi.event.id)
        .await
        .expect("Failed to approve event");

    services
        .lifecycle
        .submit(
            test_data::event_request("Dune Walk", "Goa", &[("Guide", 2)]),
            other.id,
        )
        .await
        .expect("Failed to submit event");

    let approved = services
        .lifecycle
        .list(&EventFilter {
            state: Some(LifecycleState::Approved),
            ..EventFilter::default()
        })
        .await
        .expect("Failed to list events");
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, kochi.event.id);

    let in_goa = services
        .lifecycle
        .list(&EventFilter {
            location: Some("Goa".to_string()),
            ..EventFilter::default()
        })
        .await
        .expect("Failed to list events");
    assert_eq!(in_goa.len(), 1);
    assert_eq!(in_goa[0].title, "Dune Walk");

    let by_creator = services
        .lifecycle
        .list(&EventFilter {
            created_by: Some(creator.id),
            ..EventFilter::default()
        })
        .await
        .expect("Failed to list events");
    assert_eq!(by_creator.len(), 1);
}
