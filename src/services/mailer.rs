//! Mail gateway service implementation
//!
//! This service delivers transactional email through an HTTP mail
//! gateway. It handles client setup, request shaping, rate limiting and
//! error mapping. When no gateway endpoint is configured the service
//! runs disabled and sends become logged no-ops.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::MailerConfig;
use crate::utils::errors::{MailerError, Result, VolunteerHubError};

/// Outgoing mail payload
#[derive(Debug, Clone, Serialize)]
pub struct MailRequest {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Gateway response structure
#[derive(Debug, Clone, Deserialize)]
pub struct MailResponse {
    pub ok: bool,
    pub id: Option<String>,
}

/// Mail gateway client
#[derive(Clone)]
pub struct MailerService {
    client: Client,
    config: MailerConfig,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl MailerService {
    /// Create a new MailerService instance
    pub fn new(config: MailerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("VolunteerHub/1.0")
            .build()
            .map_err(|e| VolunteerHubError::Mailer(MailerError::RequestFailed(e.to_string())))?;

        let per_minute =
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    /// Check whether a gateway endpoint is configured
    pub fn is_enabled(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Send an email through the gateway
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            debug!(to = %to, subject = %subject, "Mailer disabled, dropping email");
            return Ok(());
        };

        self.limiter.until_ready().await;

        let request = MailRequest {
            from: self.config.from_address.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let url = format!("{}/send", endpoint.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            builder = builder.header("X-Api-Key", api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                VolunteerHubError::Mailer(MailerError::Timeout)
            } else if e.is_connect() {
                VolunteerHubError::Mailer(MailerError::ServiceUnavailable)
            } else {
                VolunteerHubError::Mailer(MailerError::RequestFailed(e.to_string()))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VolunteerHubError::Mailer(MailerError::RequestFailed(
                format!("HTTP {}: {}", status, error_text),
            )));
        }

        let mail_response: MailResponse = response
            .json()
            .await
            .map_err(|e| VolunteerHubError::Mailer(MailerError::InvalidResponse(e.to_string())))?;

        if !mail_response.ok {
            return Err(VolunteerHubError::Mailer(MailerError::InvalidResponse(
                "Mail gateway returned ok: false".to_string(),
            )));
        }

        debug!(
            to = %to,
            subject = %subject,
            message_id = ?mail_response.id,
            "Email accepted by gateway"
        );
        Ok(())
    }

    /// Health check for the mail gateway
    pub async fn health_check(&self) -> Result<bool> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Ok(true);
        };

        let url = format!("{}/health", endpoint.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!(error = %e, "Mail gateway health check failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> MailerConfig {
        MailerConfig {
            endpoint: None,
            api_key: None,
            from_address: "no-reply@volunteerhub.org".to_string(),
            timeout_seconds: 5,
            rate_limit_per_minute: 60,
        }
    }

    #[test]
    fn test_disabled_mailer_drops_sends() {
        let mailer = MailerService::new(disabled_config()).unwrap();
        assert!(!mailer.is_enabled());

        tokio_test::block_on(async {
            let result = mailer.send("a@b.org", "Hello", "<p>Hi</p>").await;
            assert!(result.is_ok());

            let healthy = mailer.health_check().await.unwrap();
            assert!(healthy);
        });
    }

    #[test]
    fn test_mail_request_serialization() {
        let request = MailRequest {
            from: "no-reply@volunteerhub.org".to_string(),
            to: "volunteer@example.org".to_string(),
            subject: "Event update".to_string(),
            html: "<p>Hello</p>".to_string(),
        };

        let serialized = serde_json::to_string(&request).unwrap();
        assert!(serialized.contains("volunteer@example.org"));

        let response: MailResponse = serde_json::from_str(r#"{"ok": true, "id": "m-1"}"#).unwrap();
        assert!(response.ok);
        assert_eq!(response.id.as_deref(), Some("m-1"));
    }
}
