//! Email side-effect integration tests
//!
//! Registrations mail the event creator and completions mail every
//! registered volunteer. Both flows run here against a wiremock gateway.

mod helpers;

use chrono::Utc;
use serial_test::serial;

use helpers::{test_data, MailGatewayMock, TestDatabase};
use VolunteerHub::config::Settings;
use VolunteerHub::database::DatabaseService;
use VolunteerHub::services::ServiceFactory;

/// Service graph with the mailer pointed at a mock gateway
fn services_with_mailer(db: &TestDatabase, gateway: &MailGatewayMock) -> ServiceFactory {
    let mut settings = Settings::default();
    settings.mailer = gateway.mailer_config();
    let database = DatabaseService::new(db.pool.clone());
    ServiceFactory::new(&settings, database).expect("Failed to build service factory")
}

#[tokio::test]
#[serial]
async fn test_registration_mails_the_creator() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let gateway = MailGatewayMock::start().await;
    let services = services_with_mailer(&db, &gateway);

    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create organizer");
    let volunteer = db
        .create_test_user(&test_data::fake_name(), "Chennai")
        .await
        .expect("Failed to create volunteer");

    let detail = services
        .lifecycle
        .submit(
            test_data::event_request("Beach Cleanup", "Chennai", &[("Collector", 2)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(detail.event.id)
        .await
        .expect("Failed to approve event");

    services
        .registration
        .register(detail.event.id, volunteer.id, detail.positions[0].id)
        .await
        .expect("Registration should succeed");

    assert_eq!(gateway.received_sends().await, 1);

    let sends = gateway
        .server
        .received_requests()
        .await
        .expect("Gateway should record requests");
    let body: serde_json::Value = sends
        .iter()
        .find(|r| r.url.path() == "/send")
        .map(|r| serde_json::from_slice(&r.body).expect("Send body should be JSON"))
        .expect("A send request should exist");
    assert_eq!(body["to"], creator.email.as_str());
    assert!(body["subject"]
        .as_str()
        .expect("Subject should be a string")
        .contains("Beach Cleanup"));
    assert!(body["html"]
        .as_str()
        .expect("Html should be a string")
        .contains(&volunteer.name));
}

#[tokio::test]
#[serial]
async fn test_completion_mails_every_volunteer() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    db.cleanup().await.expect("Failed to cleanup database");

    let gateway = MailGatewayMock::start().await;
    let services = services_with_mailer(&db, &gateway);

    let creator = db
        .create_test_organizer(&test_data::fake_name(), "Mumbai")
        .await
        .expect("Failed to create organizer");
    let detail = services
        .lifecycle
        .submit(
            test_data::elapsed_event_request("Food Drive", "Mumbai", &[("Server", 3)]),
            creator.id,
        )
        .await
        .expect("Failed to submit event");
    services
        .lifecycle
        .approve(detail.event.id)
        .await
        .expect("Failed to approve event");

    let mut volunteers = Vec::new();
    for _ in 0..2 {
        let user = db
            .create_test_user(&test_data::fake_name(), "Mumbai")
            .await
            .expect("Failed to create volunteer");
        services
            .registration
            .register(detail.event.id, user.id, detail.positions[0].id)
            .await
            .expect("Registration should succeed");
        volunteers.push(user);
    }

    let sends_before = gateway.received_sends().await;

    let swept = services
        .lifecycle
        .sweep_completions(Utc::now())
        .await
        .expect("Sweep should succeed");
    assert_eq!(swept, 1);

    // One thank-you mail per registered volunteer
    assert_eq!(gateway.received_sends().await - sends_before, 2);

    let sends = gateway
        .server
        .received_requests()
        .await
        .expect("Gateway should record requests");
    let recipients: Vec<String> = sends
        .iter()
        .filter(|r| r.url.path() == "/send")
        .skip(sends_before)
        .map(|r| {
            let body: serde_json::Value =
                serde_json::from_slice(&r.body).expect("Send body should be JSON");
            body["to"].as_str().expect("To should be a string").to_string()
        })
        .collect();
    for volunteer in &volunteers {
        assert!(recipients.contains(&volunteer.email));
    }
}
