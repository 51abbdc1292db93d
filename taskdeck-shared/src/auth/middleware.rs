/// Authentication and role-gate middleware for Axum
///
/// Two layers cooperate here:
///
/// 1. **JWT middleware**: extracts the Bearer token from the Authorization
///    header, verifies it, and inserts the resulting [`Identity`] into the
///    request extensions for handlers to extract.
/// 2. **Role gate**: consults an explicit [`RoutePolicy`] table and rejects
///    requests whose verified identity does not carry the required role.
///
/// # Uniform rejection
///
/// Every authentication failure (missing header, malformed header, bad
/// signature, expired token) produces the same 401 response body, so a
/// caller cannot distinguish which check failed. The actual cause is logged
/// at debug level for operators.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use chrono::Duration;
/// use taskdeck_shared::auth::jwt::{Identity, TokenIssuer};
/// use taskdeck_shared::auth::middleware::create_jwt_middleware;
///
/// async fn whoami(Extension(identity): Extension<Identity>) -> String {
///     identity.username
/// }
///
/// let issuer = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!", Duration::hours(24));
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_jwt_middleware(issuer)));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::jwt::{Identity, TokenIssuer};
use super::policy::{Decision, RoutePolicy};

/// Error type for the authentication middleware
///
/// Variants exist for logging; the HTTP mapping deliberately collapses all
/// of them into one body.
#[derive(Debug)]
pub enum AuthError {
    /// Authorization header absent
    MissingCredentials,

    /// Authorization header present but not a Bearer token
    InvalidFormat,

    /// Token failed verification (signature, expiry, or structure)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // One body for every cause; the distinction only reaches the logs.
        let body = Json(json!({
            "error": "unauthorized",
            "message": "Authentication required",
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Error type for the role gate
#[derive(Debug)]
pub struct RoleGateError;

impl IntoResponse for RoleGateError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "forbidden",
            "message": "You do not have permission (role)",
        }));

        (StatusCode::FORBIDDEN, body).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header against the given
/// issuer and inserts the verified [`Identity`] into request extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized (uniform body) if the header is missing or
/// malformed, the signature does not verify, or the token has expired.
/// Expiry is only ever detected here, lazily, when a token is next
/// presented; there is no background invalidation.
pub async fn jwt_auth_middleware(
    issuer: TokenIssuer,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            debug!("Rejecting request: missing authorization header");
            AuthError::MissingCredentials
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        debug!("Rejecting request: authorization header is not a Bearer token");
        AuthError::InvalidFormat
    })?;

    let identity = issuer.verify(token).map_err(|e| {
        debug!("Rejecting request: token verification failed: {}", e);
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Role gate middleware
///
/// Looks up the request's method and path in the route table and rejects
/// the request with 403 when the verified identity's role is insufficient.
/// Must run after [`jwt_auth_middleware`]; a request without an identity
/// extension on a gated route is rejected outright.
pub async fn role_gate_middleware(
    policy: RoutePolicy,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if policy.required_role(&method, &path).is_some() {
        let identity = req
            .extensions()
            .get::<Identity>()
            .ok_or_else(|| AuthError::MissingCredentials.into_response())?;

        if let Decision::Deny(reason) = policy.authorize(identity, &method, &path) {
            debug!(
                username = %identity.username,
                %method,
                path = %path,
                ?reason,
                "Role gate denied request"
            );
            return Err(RoleGateError.into_response());
        }
    }

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Helper that captures the token issuer and returns a function usable
/// with `axum::middleware::from_fn`.
pub fn create_jwt_middleware(
    issuer: TokenIssuer,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    move |req, next| {
        let issuer = issuer.clone();
        Box::pin(jwt_auth_middleware(issuer, req, next))
    }
}

/// Creates a role gate middleware closure over a route table
pub fn create_role_gate(
    policy: RoutePolicy,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req, next| {
        let policy = policy.clone();
        Box::pin(role_gate_middleware(policy, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_is_uniform_401() {
        let causes = vec![
            AuthError::MissingCredentials,
            AuthError::InvalidFormat,
            AuthError::InvalidToken,
        ];

        for cause in causes {
            let response = cause.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_role_gate_error_is_403() {
        let response = RoleGateError.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
