/// JWT token issuing and verification
///
/// This module provides the stateless token credential used for
/// authentication. Tokens are signed using HS256 (HMAC-SHA256) and encode
/// the account's identity and role; validity is purely a function of
/// signature and expiry, with no server-side session store and no
/// revocation list. The compromise window for a leaked token is therefore
/// exactly its TTL.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: configurable TTL, checked on every verification
/// - **Validation order**: signature integrity first, then expiry
/// - **Secret Management**: the signing secret is passed into
///   [`TokenIssuer::new`] at startup; it is never read from ambient global
///   state and never derived from request data
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::TokenIssuer;
/// use taskdeck_shared::models::account::{Account, Role};
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!", Duration::hours(24));
///
/// let account = Account {
///     id: Uuid::new_v4(),
///     username: "alice".to_string(),
///     password_hash: String::new(),
///     role: Role::User,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// let token = issuer.issue(&account)?;
/// let identity = issuer.verify(&token)?;
/// assert_eq!(identity.id, account.id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::{Account, Role};

/// Issuer claim stamped into every token
const ISSUER: &str = "taskdeck";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature does not match the signing secret
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token TTL has elapsed
    #[error("Token has expired")]
    Expired,

    /// Token is structurally invalid (bad format, wrong issuer, bad claims)
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// Verified identity derived from a token
///
/// This is the only thing handlers ever see of the credential: the raw
/// claims never leave this module. All authorization decisions are made
/// against an `Identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account ID (token subject)
    pub id: Uuid,

    /// Username at issue time
    pub username: String,

    /// Role at issue time
    pub role: Role,
}

impl Identity {
    /// Checks whether this identity carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`) plus the username and role
/// the frontend needs for conditional rendering without a second request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account ID
    pub sub: Uuid,

    /// Username (custom claim)
    pub username: String,

    /// Role (custom claim)
    pub role: Role,

    /// Issuer - always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Checks if the claims are past their expiry
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed, time-bound tokens
///
/// The secret and TTL are explicit constructor inputs so configuration
/// flows through one place at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates a new issuer from a signing secret and token TTL
    ///
    /// The secret should be at least 32 bytes (256 bits) for HS256;
    /// configuration loading is expected to enforce that before this
    /// constructor is reached.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token for an account
    ///
    /// Serializes the account's ID, username, and role together with
    /// issued-at and expiry timestamps, then signs with the issuer secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: account.id,
            username: account.username.clone(),
            role: account.role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and extracts the identity it encodes
    ///
    /// Checks, in order:
    /// 1. Signature integrity (`TokenError::InvalidSignature` on mismatch)
    /// 2. Expiry (`TokenError::Expired` once the TTL has elapsed)
    /// 3. Structure and issuer (`TokenError::Malformed` otherwise)
    ///
    /// Verification is pure: no I/O, no shared state, safe to run
    /// concurrently on every request.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(format!("Token validation failed: {}", e)),
            })?;

        let claims = token_data.claims;

        Ok(Identity {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }

    /// The TTL applied to newly issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[cfg(any(test, feature = "test-util"))]
    /// Issues a token that expired in the past, for expiry-path tests
    pub fn issue_expired(&self, account: &Account) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: account.id,
            username: account.username.clone(),
            role: account.role,
            iss: ISSUER.to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn test_account(role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(24));
        let account = test_account(Role::User);

        let token = issuer.issue(&account).expect("Should issue token");
        let identity = issuer.verify(&token).expect("Should verify token");

        assert_eq!(identity.id, account.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::User);
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_admin_role_survives_roundtrip() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(24));
        let account = test_account(Role::Admin);

        let token = issuer.issue(&account).unwrap();
        let identity = issuer.verify(&token).unwrap();

        assert!(identity.is_admin());
    }

    #[test]
    fn test_verify_with_wrong_secret_is_invalid_signature() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(24));
        let other = TokenIssuer::new("another-secret-key-that-is-32-bytes!!", Duration::hours(24));

        let token = issuer.issue(&test_account(Role::User)).unwrap();

        let result = other.verify(&token);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_verify_expired_token() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(24));
        let token = issuer.issue_expired(&test_account(Role::User)).unwrap();

        let result = issuer.verify(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_garbage_is_malformed() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(24));

        let result = issuer.verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_token_is_valid_for_whole_ttl() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let account = test_account(Role::User);

        let token = issuer.issue(&account).unwrap();

        // A freshly issued token verifies; exp sits roughly one TTL out.
        let identity = issuer.verify(&token).unwrap();
        assert_eq!(identity.id, account.id);
    }

    #[test]
    fn test_claims_is_expired() {
        let now = Utc::now();

        let live = Claims {
            sub: Uuid::new_v4(),
            username: "u".to_string(),
            role: Role::User,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        assert!(!live.is_expired());

        let dead = Claims {
            exp: (now - Duration::seconds(1)).timestamp(),
            ..live
        };
        assert!(dead.is_expired());
    }
}
