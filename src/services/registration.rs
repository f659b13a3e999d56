//! Registration service implementation
//!
//! This service orchestrates volunteering-slot registration and
//! deregistration: it gates both on the event lifecycle state, delegates
//! the actual roster mutation to the capacity ledger, retries transient
//! store contention with jittered backoff, and triggers the registration
//! notification to the event creator.

use tracing::{debug, info, warn};

use crate::config::RegistrationConfig;
use crate::database::DatabaseService;
use crate::models::event::{Event, VolunteeringPosition};
use crate::services::notifier::NotifierService;
use crate::utils::errors::{Result, VolunteerHubError};
use crate::utils::helpers::retry_delay;
use crate::utils::logging::log_registration;

/// Result of a registration attempt
///
/// A repeat registration is an informational outcome, not a failure;
/// callers treat it as idempotent.
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    Registered { position: VolunteeringPosition },
    AlreadyRegistered,
}

/// Registration service for slot reservation and release
#[derive(Clone)]
pub struct RegistrationService {
    database: DatabaseService,
    notifier: NotifierService,
    config: RegistrationConfig,
}

impl RegistrationService {
    /// Create a new RegistrationService instance
    pub fn new(
        database: DatabaseService,
        notifier: NotifierService,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            database,
            notifier,
            config,
        }
    }

    /// Register a user for a volunteering position
    pub async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        position_id: i64,
    ) -> Result<RegistrationOutcome> {
        debug!(event_id = event_id, user_id = user_id, position_id = position_id, "Registering volunteer");

        let event = self.load_open_event(event_id).await?;

        self.database
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(VolunteerHubError::UserNotFound { user_id })?;

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        let position = loop {
            match self.database.capacity.try_reserve(event_id, position_id, user_id).await {
                Ok(position) => break position,
                Err(VolunteerHubError::AlreadyRegistered { .. }) => {
                    log_registration(event_id, position_id, user_id, "already_registered");
                    return Ok(RegistrationOutcome::AlreadyRegistered);
                }
                Err(e) if is_transient(&e) && attempt + 1 < max_attempts => {
                    let delay = retry_delay(attempt, self.config.backoff_base_ms);
                    warn!(
                        event_id = event_id,
                        position_id = position_id,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient contention on reservation, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if is_transient(&e) => {
                    return Err(VolunteerHubError::Busy(format!(
                        "Registration for event {} is contended, try again",
                        event_id
                    )));
                }
                Err(e) => return Err(e),
            }
        };

        log_registration(event_id, position_id, user_id, "registered");
        info!(
            event_id = event_id,
            position_id = position_id,
            user_id = user_id,
            available_slots = position.available_slots(),
            "Volunteer registered"
        );

        // Creator notification is best-effort and never fails the registration
        if let Err(e) = self.notifier.notify_volunteer_registered(&event, user_id).await {
            warn!(event_id = event_id, user_id = user_id, error = %e, "Failed to notify creator about registration");
        }

        Ok(RegistrationOutcome::Registered { position })
    }

    /// Release a user's slot on a position
    ///
    /// Deregistration is idempotent: releasing a slot the user does not
    /// hold returns the position unchanged.
    pub async fn deregister(
        &self,
        event_id: i64,
        user_id: i64,
        position_id: i64,
    ) -> Result<VolunteeringPosition> {
        debug!(event_id = event_id, user_id = user_id, position_id = position_id, "Deregistering volunteer");

        self.load_open_event(event_id).await?;

        let position = self.database.capacity.release(event_id, position_id, user_id).await?;

        log_registration(event_id, position_id, user_id, "deregistered");
        Ok(position)
    }

    /// Load an event and require it to accept roster changes
    async fn load_open_event(&self, event_id: i64) -> Result<Event> {
        let event = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(VolunteerHubError::EventNotFound { event_id })?;

        let state = event.lifecycle()?;
        if !state.accepts_registrations() {
            return Err(VolunteerHubError::RegistrationClosed {
                state: state.to_string(),
            });
        }

        Ok(event)
    }
}

/// Whether an error is transient store contention worth retrying
fn is_transient(error: &VolunteerHubError) -> bool {
    match error {
        VolunteerHubError::Database(sqlx::Error::Database(db)) => {
            matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
        }
        VolunteerHubError::Database(sqlx::Error::PoolTimedOut) => true,
        _ => false,
    }
}
