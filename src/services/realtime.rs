//! Realtime notification channel
//!
//! Publishes persisted notifications onto per-user Redis channels so
//! connected frontends can react without polling. Delivery here is
//! best-effort; the database row is the source of truth.

use redis::{AsyncCommands, RedisResult};
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::models::notification::Notification;
use crate::utils::errors::{Result, VolunteerHubError};

/// Redis-backed publisher for realtime notification delivery
#[derive(Clone)]
pub struct RealtimeService {
    client: redis::Client,
    config: RedisConfig,
}

impl RealtimeService {
    /// Create a new RealtimeService instance
    ///
    /// Opening the client performs no I/O; connections are established
    /// per publish so a Redis outage never blocks startup.
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| VolunteerHubError::Redis(e))?;

        Ok(Self { client, config })
    }

    /// Get Redis connection
    async fn get_connection(&self) -> Result<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| VolunteerHubError::Redis(e))
    }

    /// Channel name for a user's notification stream
    fn channel_for(&self, user_id: i64) -> String {
        format!("{}user:{}", self.config.prefix, user_id)
    }

    /// Publish a notification to the owner's channel
    pub async fn publish_notification(
        &self,
        user_id: i64,
        notification: &Notification,
    ) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let channel = self.channel_for(user_id);
        let payload = serde_json::to_string(notification)
            .map_err(|e| VolunteerHubError::Serialization(e))?;

        let receivers: i64 = conn
            .publish(&channel, payload)
            .await
            .map_err(|e| VolunteerHubError::Redis(e))?;

        debug!(
            channel = %channel,
            receivers = receivers,
            "Notification published to realtime channel"
        );
        Ok(())
    }

    /// Health check for the Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => {
                        debug!(response = %response, "Redis health check successful");
                        Ok(response == "PONG")
                    }
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                Ok(false)
            }
        }
    }
}
