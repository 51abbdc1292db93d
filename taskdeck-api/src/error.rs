/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts automatically
/// to the appropriate status code and structured JSON body.
///
/// # Taxonomy
///
/// - `Validation` (400): malformed input, rejected before any persistence
///   or authorization check
/// - `Unauthorized` (401): missing/invalid/expired credentials; one body
///   regardless of which check failed
/// - `Forbidden` (403): role or ownership denial
/// - `NotFound` (404): missing resource
/// - `Conflict` (409): unique constraint collision (duplicate username)
/// - `Internal` (500): anything else; detail is logged, never sent
///
/// Nothing is retried and nothing is swallowed: every failure surfaces to
/// the caller as one of the variants above.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskdeck_shared::auth::password::PasswordError;
use taskdeck_shared::auth::policy::{Decision, DenyReason};
use taskdeck_shared::auth::jwt::TokenError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input (400)
    Validation(Vec<ValidationErrorDetail>),

    /// Missing or invalid credentials (401), uniform body
    Unauthorized,

    /// Role or ownership denial (403)
    Forbidden(String),

    /// Missing resource (404)
    NotFound(String),

    /// Unique constraint collision (409)
    Conflict(String),

    /// Internal server error (500)
    Internal(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "validation_error", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Builds a 403 for a policy denial
    ///
    /// Panics in debug builds if called with `Decision::Allow`; callers
    /// only reach this from a deny branch.
    pub fn from_denial(decision: Decision) -> Self {
        match decision {
            Decision::Deny(DenyReason::Ownership) => {
                ApiError::Forbidden("Access denied".to_string())
            }
            Decision::Deny(DenyReason::Role) => {
                ApiError::Forbidden("You do not have permission (role)".to_string())
            }
            Decision::Allow => {
                debug_assert!(false, "from_denial called with Allow");
                ApiError::Internal("Inconsistent policy decision".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            // The cause (missing header vs bad signature vs expiry) is
            // logged by the middleware at debug level; the body never
            // distinguishes them.
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(errors)
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert token errors to API errors
///
/// Issue failures are server-side problems; every verification failure is
/// the same 401 as any other authentication error.
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::CreateError(msg) => {
                ApiError::Internal(format!("Token creation failed: {}", msg))
            }
            TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed(_) => {
                tracing::debug!("Token rejected: {}", err);
                ApiError::Unauthorized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::Conflict("Username already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: Username already exists");
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must not be empty".to_string(),
            },
            ValidationErrorDetail {
                field: "dueDate".to_string(),
                message: "Invalid date".to_string(),
            },
        ];

        let err = ApiError::Validation(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".to_string()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_denial() {
        use taskdeck_shared::auth::policy::{Decision, DenyReason};

        let err = ApiError::from_denial(Decision::Deny(DenyReason::Ownership));
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = ApiError::from_denial(Decision::Deny(DenyReason::Role));
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_token_verification_errors_collapse_to_unauthorized() {
        for err in [
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::Malformed("junk".to_string()),
        ] {
            assert!(matches!(ApiError::from(err), ApiError::Unauthorized));
        }
    }
}
