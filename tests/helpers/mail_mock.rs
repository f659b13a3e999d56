//! Mock mail gateway backed by wiremock

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use VolunteerHub::config::MailerConfig;

/// Mock HTTP mail gateway
pub struct MailGatewayMock {
    pub server: MockServer,
}

impl MailGatewayMock {
    /// Start a gateway that accepts every send
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "id": "msg-1" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Start a gateway that rejects every send with the given status
    pub async fn start_failing(status: u16) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Mailer configuration pointing at this gateway
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            endpoint: Some(self.server.uri()),
            api_key: Some("test-key".to_string()),
            from_address: "no-reply@volunteerhub.test".to_string(),
            timeout_seconds: 5,
            rate_limit_per_minute: 600,
        }
    }

    /// Number of send requests the gateway has received
    pub async fn received_sends(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/send")
            .count()
    }
}
