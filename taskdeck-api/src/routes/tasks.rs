/// Task endpoints
///
/// CRUD over tasks, scoped by the access policy:
///
/// - `GET    /tasks` - list tasks visible to the caller
/// - `GET    /tasks/:id` - fetch one task
/// - `POST   /tasks` - create a task owned by the caller
/// - `PUT    /tasks/:id` - partially update a task
/// - `DELETE /tasks/:id` - delete a task
///
/// All routes run behind the JWT middleware, so every handler receives a
/// verified [`Identity`] extension.
///
/// Existence is checked before ownership on the `:id` routes: a missing
/// task is a 404 for everyone, admin or not, and only found tasks are
/// submitted to the policy. Validation runs before either.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use taskdeck_shared::{
    auth::jwt::Identity,
    auth::policy::{authorize_task, task_scope, TaskAction},
    models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// There is no owner field: the owner is always the authenticated caller,
/// and an `ownerId` smuggled into the body is ignored by deserialization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Due date (ISO 8601 date)
    pub due_date: NaiveDate,

    /// Initial status (defaults to "Pending")
    pub status: Option<TaskStatus>,

    /// Initial priority (defaults to "Medium")
    pub priority: Option<TaskPriority>,
}

/// Update task request
///
/// All fields optional; the owner is not updatable.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,
}

/// Pagination query parameters for listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of items to return (default 100)
    pub limit: Option<i64>,

    /// Number of items to skip (default 0)
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Lists tasks visible to the caller
///
/// Admins see every task; everyone else sees only their own. The scope is
/// computed by the policy and pushed into the query, so there is no
/// post-filtering.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let scope = task_scope(&identity);
    let tasks = Task::list(&state.db, scope, query.limit(), query.offset()).await?;

    Ok(Json(tasks))
}

/// Fetches a single task
///
/// # Errors
///
/// - `404 Not Found`: no task with this ID
/// - `403 Forbidden`: task exists but belongs to someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let decision = authorize_task(&identity, TaskAction::Read, task.owner_id);
    if !decision.is_allowed() {
        return Err(ApiError::from_denial(decision));
    }

    Ok(Json(task))
}

/// Creates a task owned by the caller
///
/// Any authenticated identity may create tasks. The owner is forced to the
/// caller's account ID regardless of anything in the request body.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            priority: req.priority,
            owner_id: identity.id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially updates a task
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `404 Not Found`: no task with this ID
/// - `403 Forbidden`: task exists but belongs to someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let decision = authorize_task(&identity, TaskAction::Update, task.owner_id);
    if !decision.is_allowed() {
        return Err(ApiError::from_denial(decision));
    }

    let updated = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            priority: req.priority,
        },
    )
    .await?
    // Deleted between the existence check and the write
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a task
///
/// Deleting twice is well-defined: the first call returns 204, the second
/// 404, because the existence check runs before anything else.
///
/// # Errors
///
/// - `404 Not Found`: no task with this ID
/// - `403 Forbidden`: task exists but belongs to someone else
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let decision = authorize_task(&identity, TaskAction::Delete, task.owner_id);
    if !decision.is_allowed() {
        return Err(ApiError::from_denial(decision));
    }

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_has_no_owner_to_spoof() {
        // A smuggled ownerId deserializes to nothing: the struct has no
        // owner field, so the handler can only use the caller's identity.
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "title": "Ship release",
            "description": "Tag and publish",
            "dueDate": "2025-07-01",
            "ownerId": "00000000-0000-0000-0000-000000000000"
        }))
        .unwrap();

        assert_eq!(req.title, "Ship release");
        assert!(req.status.is_none());
        assert!(req.priority.is_none());
    }

    #[test]
    fn test_create_request_parses_wire_enums() {
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "title": "t",
            "description": "d",
            "dueDate": "2025-07-01",
            "status": "In Progress",
            "priority": "High"
        }))
        .unwrap();

        assert_eq!(req.status, Some(TaskStatus::InProgress));
        assert_eq!(req.priority, Some(TaskPriority::High));
    }

    #[test]
    fn test_list_query_defaults_and_clamping() {
        let query = ListQuery {
            limit: None,
            offset: None,
        };
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 0);

        let query = ListQuery {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(query.limit(), 500);
        assert_eq!(query.offset(), 0);
    }
}
