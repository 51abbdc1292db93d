/// Client-side session state
///
/// Holds the current access token and the identity derived from it, for
/// the UI to render conditionally (show admin navigation, greet the user)
/// without a round trip to the server.
///
/// The identity is read straight out of the token's payload segment with
/// no signature check. That is safe for this purpose: the client only uses
/// it for display decisions, and the server re-verifies the full token on
/// every request. Tampering with the payload locally changes what the UI
/// shows, never what the API allows.
///
/// # State machine
///
/// ```text
/// Anonymous --log_in(token)--> Authenticated
/// Authenticated --token TTL elapses--> Expired   (observed lazily)
/// Authenticated --log_out()--> Anonymous
/// Expired --log_out()--> Anonymous
/// ```
///
/// Expiry is never detected by a timer: [`Session::state`] compares the
/// recorded expiry against the clock whenever somebody asks.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use taskdeck_shared::auth::jwt::Identity;
use taskdeck_shared::models::account::Role;
use uuid::Uuid;

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token could not be decoded into an identity
    #[error("Malformed token: {0}")]
    MalformedToken(String),
}

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token held
    Anonymous,

    /// Token held and not yet past its expiry
    Authenticated,

    /// Token held but past its expiry; discard it to return to Anonymous
    Expired,
}

/// The subset of token claims the client reads
#[derive(Debug, Deserialize)]
struct TokenPayload {
    sub: Uuid,
    username: String,
    role: Role,
    exp: i64,
}

/// Client-held token and derived identity
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    identity: Option<Identity>,
    expires_at: Option<i64>,
}

impl Session {
    /// Creates a new anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a token and derives the identity from its payload
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MalformedToken` if the token is not a JWT or
    /// its payload does not carry the expected claims. The session is left
    /// unchanged on error.
    pub fn log_in(&mut self, token: String) -> Result<&Identity, SessionError> {
        let payload = decode_payload(&token)?;

        self.identity = Some(Identity {
            id: payload.sub,
            username: payload.username,
            role: payload.role,
        });
        self.expires_at = Some(payload.exp);
        self.token = Some(token);

        Ok(self.identity.as_ref().unwrap())
    }

    /// Discards the token and identity
    ///
    /// The server is not involved: tokens are stateless, so forgetting the
    /// credential is all a logout is.
    pub fn log_out(&mut self) {
        self.token = None;
        self.identity = None;
        self.expires_at = None;
    }

    /// Reports the current state, checking expiry lazily against the clock
    pub fn state(&self) -> SessionState {
        match (&self.token, self.expires_at) {
            (None, _) => SessionState::Anonymous,
            (Some(_), Some(exp)) if Utc::now().timestamp() >= exp => SessionState::Expired,
            (Some(_), _) => SessionState::Authenticated,
        }
    }

    /// The identity derived at login, if any
    ///
    /// Still present while the session is Expired; callers deciding what
    /// to render should consult [`Session::state`] first.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The raw token, if one is held
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True when the session holds an admin identity
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().map(|i| i.is_admin()).unwrap_or(false)
    }
}

/// Decodes the payload segment of a JWT without verifying its signature
fn decode_payload(token: &str) -> Result<TokenPayload, SessionError> {
    let payload_b64 = token
        .split('.')
        .nth(1)
        .ok_or_else(|| SessionError::MalformedToken("Not a three-segment JWT".to_string()))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| SessionError::MalformedToken(format!("Payload is not base64url: {}", e)))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|e| SessionError::MalformedToken(format!("Payload claims invalid: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use taskdeck_shared::auth::jwt::TokenIssuer;
    use taskdeck_shared::models::account::Account;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn account(role: Role) -> Account {
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
    fn test_new_session_is_anonymous() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.identity().is_none());
        assert!(session.token().is_none());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_log_in_derives_identity_without_verification_key() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let account = account(Role::Admin);
        let token = issuer.issue(&account).unwrap();

        // The session never sees the secret
        let mut session = Session::new();
        let identity = session.log_in(token.clone()).unwrap();

        assert_eq!(identity.id, account.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Admin);

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.token(), Some(token.as_str()));
        assert!(session.is_admin());
    }

    #[test]
    fn test_expiry_is_detected_lazily() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let token = issuer.issue_expired(&account(Role::User)).unwrap();

        let mut session = Session::new();
        session.log_in(token).unwrap();

        // No timer fired; the state check itself observes the expiry
        assert_eq!(session.state(), SessionState::Expired);

        // Identity is still readable until the token is discarded
        assert!(session.identity().is_some());

        session.log_out();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_log_out_returns_to_anonymous() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let token = issuer.issue(&account(Role::User)).unwrap();

        let mut session = Session::new();
        session.log_in(token).unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);

        session.log_out();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_malformed_token_leaves_session_unchanged() {
        let mut session = Session::new();

        assert!(session.log_in("garbage".to_string()).is_err());
        assert!(session.log_in("a.b".to_string()).is_err());
        assert!(session
            .log_in("header.!!!not-base64!!!.sig".to_string())
            .is_err());

        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_payload_with_missing_claims_is_rejected() {
        // Valid base64url payload, but not our claims shape
        let payload = URL_SAFE_NO_PAD.encode(br#"{"foo": "bar"}"#);
        let token = format!("eyJh.{}.sig", payload);

        let mut session = Session::new();
        assert!(matches!(
            session.log_in(token),
            Err(SessionError::MalformedToken(_))
        ));
    }
}
