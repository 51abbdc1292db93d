/// Task model and database operations
///
/// This module provides the Task model: the owned resource that the access
/// policy scopes per account. Every task has exactly one owner; the owner
/// is set at creation time and never updated afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     due_date DATE NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     owner_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{CreateTask, Task, TaskScope};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Ship release".to_string(),
///     description: "Tag and publish v1.2".to_string(),
///     due_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     status: None,
///     priority: None,
///     owner_id,
/// }).await?;
///
/// // Non-admins only ever see their own tasks
/// let mine = Task::list(&pool, TaskScope::OwnedBy(owner_id), 50, 0).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task progress status
///
/// Wire values keep the display casing the frontend renders directly
/// ("Pending", "In Progress", "Completed"); the database stores snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[serde(rename = "Pending")]
    Pending,

    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,

    /// Done
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    #[serde(rename = "Low")]
    Low,

    #[serde(rename = "Medium")]
    Medium,

    #[serde(rename = "High")]
    High,
}

impl TaskPriority {
    /// Converts priority to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Visibility scope for task listings
///
/// Produced by the access policy from a verified identity and consumed by
/// [`Task::list`]: admins get [`TaskScope::All`], everyone else gets
/// [`TaskScope::OwnedBy`] their own account ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// All tasks, regardless of owner (admin only)
    All,

    /// Only tasks owned by the given account
    OwnedBy(Uuid),
}

/// Task model representing a tracked work item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Date the task is due
    pub due_date: NaiveDate,

    /// Current progress status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Account that owns this task, immutable after creation
    pub owner_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// There is deliberately no way for a caller to pick an arbitrary owner:
/// `owner_id` is filled in by the handler from the verified identity, never
/// from the request body.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Due date
    pub due_date: NaiveDate,

    /// Initial status (defaults to pending)
    pub status: Option<TaskStatus>,

    /// Initial priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Owning account, taken from the authenticated identity
    pub owner_id: Uuid,
}

/// Input for updating a task
///
/// All fields are optional; the owner is not updatable.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,
}

impl UpdateTask {
    /// Checks whether the update carries any change at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

impl Task {
    /// Creates a new task
    ///
    /// Status defaults to pending and priority to medium when not supplied.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, status, priority, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, due_date, status, priority, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status.unwrap_or(TaskStatus::Pending))
        .bind(data.priority.unwrap_or(TaskPriority::Medium))
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, status, priority, owner_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks visible under the given scope, newest first
    pub async fn list(
        pool: &PgPool,
        scope: TaskScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match scope {
            TaskScope::All => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, due_date, status, priority, owner_id,
                           created_at, updated_at
                    FROM tasks
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            TaskScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, due_date, status, priority, owner_id,
                           created_at, updated_at
                    FROM tasks
                    WHERE owner_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(owner_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Updates an existing task
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed. The owner column is never part of the statement. Returns
    /// None if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, due_date, status, priority, \
             owner_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it did not exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_task_status_wire_casing() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In Progress\""
        );

        let status: TaskStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(status, TaskStatus::Pending);
    }

    #[test]
    fn test_task_priority_wire_casing() {
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "\"High\"");

        let priority: TaskPriority = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(priority, TaskPriority::Medium);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("dueDate").is_some());
        assert!(json.get("ownerId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let update = UpdateTask {
            title: Some("new".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
