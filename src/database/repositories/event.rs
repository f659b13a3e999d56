//! Event repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::event::{
    CreateEventRequest, Event, EventDetail, EventFilter, LifecycleState, UpdateEventRequest,
    VolunteeringPosition,
};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event together with its positions
    pub async fn create(
        &self,
        request: CreateEventRequest,
        slug: &str,
        created_by: i64,
    ) -> Result<EventDetail, VolunteerHubError> {
        let mut tx = self.pool.begin().await?;

        let event = match sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, slug, location, start_date, end_date, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(slug)
        .bind(request.location)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(created_by)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        {
            Ok(event) => event,
            Err(e) if is_unique_violation(&e) => {
                return Err(VolunteerHubError::Conflict(format!(
                    "Event slug already in use: {}",
                    slug
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let mut positions = Vec::with_capacity(request.positions.len());
        for (index, position) in request.positions.into_iter().enumerate() {
            let created = match sqlx::query_as::<_, VolunteeringPosition>(
                r#"
                INSERT INTO event_positions (event_id, title, total_slots, display_order, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at
                "#
            )
            .bind(event.id)
            .bind(position.title)
            .bind(position.total_slots)
            .bind(index as i32)
            .bind(Utc::now())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            {
                Ok(position) => position,
                Err(e) if is_unique_violation(&e) => {
                    return Err(VolunteerHubError::Conflict(
                        "Duplicate position title within event".to_string(),
                    ))
                }
                Err(e) => return Err(e.into()),
            };
            positions.push(created);
        }

        tx.commit().await?;

        Ok(EventDetail { event, positions })
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, VolunteerHubError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, VolunteerHubError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at FROM events WHERE slug = $1"
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Check whether a slug is taken, optionally ignoring one event
    pub async fn slug_exists(
        &self,
        slug: &str,
        exclude_event: Option<i64>,
    ) -> Result<bool, VolunteerHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)",
        )
        .bind(slug)
        .bind(exclude_event)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// List events matching the filter, newest first
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, VolunteerHubError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at
            FROM events
            WHERE ($1::bigint IS NULL OR created_by = $1)
              AND ($2::text IS NULL OR location = $2)
              AND ($3::text IS NULL OR lifecycle_state = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.created_by)
        .bind(filter.location.as_deref())
        .bind(filter.state.map(|s| s.as_str()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Update event fields, optionally replacing the slug
    pub async fn update(
        &self,
        id: i64,
        request: UpdateEventRequest,
        slug: Option<String>,
    ) -> Result<Option<Event>, VolunteerHubError> {
        let event = match sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                slug = COALESCE($7, slug),
                updated_at = $8
            WHERE id = $1
            RETURNING id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(slug)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(event) => event,
            Err(e) if is_unique_violation(&e) => {
                return Err(VolunteerHubError::Conflict(
                    "Event slug already in use".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(event)
    }

    /// Delete event, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, VolunteerHubError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition an event between lifecycle states
    ///
    /// The update is conditional on the current state so concurrent
    /// callers cannot apply the same transition twice. Returns the
    /// updated event, or `None` when the event was absent or not in
    /// the expected state.
    pub async fn transition_state(
        &self,
        id: i64,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<Option<Event>, VolunteerHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET lifecycle_state = $3, updated_at = $4
            WHERE id = $1 AND lifecycle_state = $2
            RETURNING id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Approved events whose end date has passed
    pub async fn completion_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, VolunteerHubError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, slug, location, lifecycle_state, start_date, end_date, registered_volunteers, summary_published, created_by, created_at, updated_at FROM events WHERE lifecycle_state = 'approved' AND end_date < $1 ORDER BY end_date ASC"
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get positions for an event in display order
    pub async fn positions_for_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<VolunteeringPosition>, VolunteerHubError> {
        let positions = sqlx::query_as::<_, VolunteeringPosition>(
            "SELECT id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at FROM event_positions WHERE event_id = $1 ORDER BY display_order ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    /// Find a single position of an event
    pub async fn find_position(
        &self,
        event_id: i64,
        position_id: i64,
    ) -> Result<Option<VolunteeringPosition>, VolunteerHubError> {
        let position = sqlx::query_as::<_, VolunteeringPosition>(
            "SELECT id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at FROM event_positions WHERE event_id = $1 AND id = $2"
        )
        .bind(event_id)
        .bind(position_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }

    /// Resize a position, refusing to shrink below the current roster
    ///
    /// Returns `None` when no row matched, either because the position
    /// does not exist or because the new size is smaller than the number
    /// of already registered users.
    pub async fn update_position_slots(
        &self,
        event_id: i64,
        position_id: i64,
        total_slots: i32,
    ) -> Result<Option<VolunteeringPosition>, VolunteerHubError> {
        let position = sqlx::query_as::<_, VolunteeringPosition>(
            r#"
            UPDATE event_positions
            SET total_slots = $3, updated_at = $4
            WHERE id = $2 AND event_id = $1 AND cardinality(registered_users) <= $3
            RETURNING id, event_id, title, total_slots, registered_users, display_order, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(position_id)
        .bind(total_slots)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }
}
