//! User repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::{CreateUserRequest, User};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, VolunteerHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, location, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, location, role, created_at
            "#,
        )
        .bind(request.name)
        .bind(request.email)
        .bind(request.location)
        .bind(request.role.unwrap_or_else(|| "user".to_string()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, VolunteerHubError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, location, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, VolunteerHubError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, location, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Users in a location, excluding one user
    ///
    /// Used for area announcements where the event creator must not be
    /// notified about their own event.
    pub async fn find_by_location_excluding(
        &self,
        location: &str,
        exclude_user: i64,
    ) -> Result<Vec<User>, VolunteerHubError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, location, role, created_at FROM users WHERE location = $1 AND id <> $2 ORDER BY id ASC"
        )
        .bind(location)
        .bind(exclude_user)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Fetch a batch of users by their IDs
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, VolunteerHubError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, location, role, created_at FROM users WHERE id = ANY($1) ORDER BY id ASC"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
