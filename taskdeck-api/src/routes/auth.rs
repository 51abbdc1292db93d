/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Verify credentials and mint an access token
///
/// Login is the only public endpoint besides the health check. There is no
/// logout endpoint: tokens are stateless, so logging out is purely the
/// client discarding its token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{auth::password, models::account::Account};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed access token
    pub access_token: String,
}

/// Login endpoint
///
/// Looks up the account, verifies the password, and issues a token.
///
/// An unknown username and a wrong password produce byte-identical 401
/// responses, so the endpoint cannot be used to enumerate usernames.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let account = Account::find_by_username(&state.db, &req.username).await?;

    // Collapse "no such user" and "wrong password" into one rejection path
    let valid = match &account {
        Some(account) => password::verify_password(&req.password, &account.password_hash),
        None => false,
    };

    let account = match (account, valid) {
        (Some(account), true) => account,
        _ => {
            tracing::debug!(username = %req.username, "Login rejected");
            return Err(ApiError::Unauthorized);
        }
    };

    let access_token = state.token_issuer.issue(&account)?;

    tracing::info!(username = %account.username, "Login succeeded");

    Ok(Json(LoginResponse { access_token }))
}
