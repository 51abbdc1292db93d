/// Account management endpoints
///
/// CRUD over accounts, restricted to admins by the route/role table:
///
/// - `GET    /users` - list accounts
/// - `GET    /users/:id` - fetch one account
/// - `POST   /users` - create an account
/// - `PUT    /users/:id` - partially update an account
/// - `DELETE /users/:id` - delete an account (cascades to its tasks)
///
/// Handlers contain no role checks of their own: the gate middleware has
/// already required the admin role before any of these run. Password
/// hashes never appear in responses (the model skips them on
/// serialization).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskdeck_shared::{
    auth::password,
    models::account::{Account, CreateAccount, Role, UpdateAccount},
};
use uuid::Uuid;
use validator::Validate;

use super::tasks::ListQuery;

/// Create account request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"))]
    pub username: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Role for the new account
    pub role: Role,
}

/// Update account request
///
/// All fields optional. A supplied password is re-hashed before storage;
/// the stored hash is never patched directly.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New username
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"))]
    pub username: Option<String>,

    /// New plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// New role
    pub role: Option<Role>,
}

/// Lists accounts
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = Account::list(&state.db, query.limit(), query.offset()).await?;

    Ok(Json(accounts))
}

/// Fetches a single account
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Account>> {
    let account = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(account))
}

/// Creates an account
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `409 Conflict`: username already exists
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            username: req.username,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(username = %account.username, role = account.role.as_str(), "Account created");

    Ok((StatusCode::CREATED, Json(account)))
}

/// Partially updates an account
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `404 Not Found`: no account with this ID
/// - `409 Conflict`: new username already exists
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<Account>> {
    req.validate()?;

    // Hash a replacement password before it goes anywhere near the store
    let password_hash = match &req.password {
        Some(plaintext) => Some(password::hash_password(plaintext)?),
        None => None,
    };

    let account = Account::update(
        &state.db,
        id,
        UpdateAccount {
            username: req.username,
            password_hash,
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(account))
}

/// Deletes an account
///
/// The account's tasks are removed with it (ON DELETE CASCADE).
///
/// # Errors
///
/// - `404 Not Found`: no account with this ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Account::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
