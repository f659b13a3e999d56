//! Task repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::task::{Task, TaskStatus};
use crate::utils::errors::VolunteerHubError;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new task for a volunteer
    pub async fn create(
        &self,
        event_id: i64,
        assigned_to: i64,
        description: &str,
    ) -> Result<Task, VolunteerHubError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (event_id, assigned_to, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(assigned_to)
        .bind(description)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    /// Find task by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Task>, VolunteerHubError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at FROM tasks WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Update task status
    pub async fn update_status(
        &self,
        id: i64,
        status: TaskStatus,
    ) -> Result<Option<Task>, VolunteerHubError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Attach proof to a task
    ///
    /// Conditional on no proof being present yet, so double submissions
    /// lose the race instead of overwriting each other.
    pub async fn set_proof(
        &self,
        id: i64,
        message: &str,
        images: &[String],
    ) -> Result<Option<Task>, VolunteerHubError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET proof_submitted = TRUE, proof_message = $2, proof_images = $3, updated_at = $4
            WHERE id = $1 AND proof_submitted = FALSE
            RETURNING id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(message)
        .bind(images)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Clear a rejected proof so the assignee can resubmit
    pub async fn clear_proof(&self, id: i64) -> Result<Option<Task>, VolunteerHubError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET proof_submitted = FALSE, proof_message = NULL, proof_images = '{}', updated_at = $2
            WHERE id = $1
            RETURNING id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Get all tasks of an event
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Task>, VolunteerHubError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at FROM tasks WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Get the tasks of one volunteer within an event
    pub async fn list_for_volunteer(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<Vec<Task>, VolunteerHubError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, event_id, assigned_to, description, status, proof_submitted, proof_message, proof_images, created_at, updated_at FROM tasks WHERE event_id = $1 AND assigned_to = $2 ORDER BY created_at ASC, id ASC"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }
}
