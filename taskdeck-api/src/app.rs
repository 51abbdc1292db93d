/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::{
    jwt::TokenIssuer,
    middleware::{create_jwt_middleware, create_role_gate},
    policy::{RoutePolicy, RouteRule},
};
use taskdeck_shared::models::account::Role;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token issuer, built once from the configured secret and TTL
    pub token_issuer: TokenIssuer,
}

impl AppState {
    /// Creates new application state
    ///
    /// The token issuer is constructed here so the signing secret flows
    /// from configuration into exactly one place.
    pub fn new(db: PgPool, config: Config) -> Self {
        let token_issuer = TokenIssuer::new(
            &config.jwt.secret,
            Duration::seconds(config.jwt.ttl_seconds),
        );

        Self {
            db,
            config: Arc::new(config),
            token_issuer,
        }
    }
}

/// The route/role table
///
/// Every role-gated surface of the API is declared here and nowhere else;
/// the gate middleware consults this table for each request. Routes not
/// listed are open to any authenticated identity.
pub fn route_policy() -> RoutePolicy {
    RoutePolicy::new(vec![
        // Account management is admin-only, for every method
        RouteRule::for_prefix("/users", Role::Admin),
    ])
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health              # Health check (public)
/// ├── /auth/login          # POST, credential verification (public)
/// ├── /tasks               # GET, POST          (authenticated)
/// ├── /tasks/:id           # GET, PUT, DELETE   (authenticated + ownership policy)
/// └── /users[/:id]         # CRUD               (authenticated + admin role gate)
/// ```
///
/// # Middleware Stack
///
/// Request flow, outside in:
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication (protected routes only)
/// 4. Role gate over the route table (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new().route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/", post(routes::users::create_user))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user));

    // Protected surface: JWT runs first (outermost), then the role gate,
    // so the gate always sees a verified identity.
    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .layer(axum::middleware::from_fn(create_role_gate(route_policy())))
        .layer(axum::middleware::from_fn(create_jwt_middleware(
            state.token_issuer.clone(),
        )));

    // Configure CORS from the single allowed origin
    let cors = if state.config.api.cors_allowed_origin == "*" {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origin: Vec<HeaderValue> = std::iter::once(&state.config.api.cors_allowed_origin)
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_policy_gates_users_not_tasks() {
        let policy = route_policy();

        assert_eq!(
            policy.required_role(&Method::GET, "/users"),
            Some(Role::Admin)
        );
        assert_eq!(
            policy.required_role(&Method::DELETE, "/users/some-id"),
            Some(Role::Admin)
        );
        assert_eq!(policy.required_role(&Method::GET, "/tasks"), None);
        assert_eq!(policy.required_role(&Method::POST, "/auth/login"), None);
    }
}
