//! Capacity ledger for volunteering slots
//!
//! All roster mutations go through this ledger. Registrations take a
//! row lock on the event and claim slots with conditional single-statement
//! updates, so capacity can never be oversubscribed by concurrent callers
//! and a user can never end up in two positions of the same event.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::event::VolunteeringPosition;
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct CapacityLedger {
    pool: PgPool,
}

impl CapacityLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reserve a slot in a position for a user
    ///
    /// The event row is locked first so the cross-position roster check
    /// and the slot claim observe a consistent state. The claim itself
    /// only applies while `cardinality(registered_users) < total_slots`,
    /// which is what makes oversubscription impossible.
    pub async fn try_reserve(
        &self,
        event_id: i64,
        position_id: i64,
        user_id: i64,
    ) -> Result<VolunteeringPosition, VolunteerHubError> {
        let mut tx = self.pool.begin().await?;

        let roster: Option<(Vec<i64>,)> =
            sqlx::query_as("SELECT registered_volunteers FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((registered_volunteers,)) = roster else {
            return Err(VolunteerHubError::EventNotFound { event_id });
        };

        if registered_volunteers.contains(&user_id) {
            return Err(VolunteerHubError::AlreadyRegistered { event_id, user_id });
        }

        let position = sqlx::query_as::<_, VolunteeringPosition>(
            r#"
            UPDATE event_positions
            SET registered_users = array_append(registered_users, $3), updated_at = $4
            WHERE id = $2 AND event_id = $1
              AND cardinality(registered_users) < total_slots
              AND NOT ($3 = ANY(registered_users))
            RETURNING id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(position_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(position) = position else {
            let exists: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_positions WHERE id = $2 AND event_id = $1",
            )
            .bind(event_id)
            .bind(position_id)
            .fetch_one(&mut *tx)
            .await?;

            if exists.0 == 0 {
                return Err(VolunteerHubError::PositionNotFound {
                    event_id,
                    position_id,
                });
            }
            return Err(VolunteerHubError::SlotsExhausted { position_id });
        };

        sqlx::query(
            "UPDATE events SET registered_volunteers = array_append(registered_volunteers, $2), updated_at = $3 WHERE id = $1"
        )
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(position)
    }

    /// Release a previously reserved slot
    ///
    /// Removing a user who holds no slot is a no-op, so releases are
    /// idempotent. The event-level roster entry is dropped only once no
    /// position of the event still holds the user.
    pub async fn release(
        &self,
        event_id: i64,
        position_id: i64,
        user_id: i64,
    ) -> Result<VolunteeringPosition, VolunteerHubError> {
        let mut tx = self.pool.begin().await?;

        let roster: Option<(Vec<i64>,)> =
            sqlx::query_as("SELECT registered_volunteers FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        if roster.is_none() {
            return Err(VolunteerHubError::EventNotFound { event_id });
        }

        let position = sqlx::query_as::<_, VolunteeringPosition>(
            r#"
            UPDATE event_positions
            SET registered_users = array_remove(registered_users, $3), updated_at = $4
            WHERE id = $2 AND event_id = $1
            RETURNING id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(position_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(position) = position else {
            return Err(VolunteerHubError::PositionNotFound {
                event_id,
                position_id,
            });
        };

        let still_held: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_positions WHERE event_id = $1 AND $2 = ANY(registered_users)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if still_held.0 == 0 {
            sqlx::query(
                "UPDATE events SET registered_volunteers = array_remove(registered_volunteers, $2), updated_at = $3 WHERE id = $1"
            )
            .bind(event_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(position)
    }

    /// Check whether a user holds any slot of an event
    pub async fn is_volunteer(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<bool, VolunteerHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE id = $1 AND $2 = ANY(registered_volunteers)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }
}
