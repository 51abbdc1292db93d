/// Authentication and authorization
///
/// This module provides the security core of Taskdeck:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: stateless token issue and verification
/// - [`policy`]: pure allow/deny decisions for tasks and role-gated routes
/// - [`middleware`]: Axum layers wiring the above into the request path
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: HS256 signing, explicit secret and TTL injection
/// - **Uniform 401s**: authentication failures are indistinguishable to
///   callers regardless of cause
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskdeck_shared::auth::jwt::TokenIssuer;
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// let issuer = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!", Duration::hours(24));
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
