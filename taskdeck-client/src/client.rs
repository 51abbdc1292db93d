/// Typed HTTP client for the Taskdeck API
///
/// Wraps the full HTTP surface (login, task CRUD, account management)
/// behind typed methods, owns a [`Session`] for the token, and maps
/// response status codes onto a client error taxonomy mirroring the
/// server's.
///
/// # Example
///
/// ```no_run
/// use taskdeck_client::client::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = ApiClient::new("http://localhost:8080")?;
///
/// let identity = client.login("alice", "correct horse battery staple").await?;
/// println!("Logged in as {}", identity.username);
///
/// for task in client.list_tasks().await? {
///     println!("{}: {}", task.id, task.title);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use taskdeck_shared::auth::jwt::Identity;
use taskdeck_shared::models::account::{Account, Role};
use taskdeck_shared::models::task::{Task, TaskPriority, TaskStatus};
use uuid::Uuid;

use crate::session::{Session, SessionState};

/// Error type for API client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL or a derived URL failed to parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No token held; log in first
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Held token is past its expiry; it has been discarded
    #[error("Session expired")]
    SessionExpired,

    /// Server rejected the input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Server rejected the credentials or token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Server denied the operation (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state, e.g. duplicate username (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Token came back unreadable
    #[error(transparent)]
    Session(#[from] crate::session::SessionError),
}

/// Login request body
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Login response body
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Error body shape shared by all server error responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Fields for creating a task
///
/// There is no owner field; the server assigns ownership to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Due date
    pub due_date: NaiveDate,

    /// Initial status (server defaults to "Pending")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Initial priority (server defaults to "Medium")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

/// Partial update for a task
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// New priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

/// Fields for creating an account (admin only)
#[derive(Debug, Clone, Serialize)]
pub struct AccountDraft {
    /// Username
    pub username: String,

    /// Plaintext password; the server hashes it
    pub password: String,

    /// Role for the new account
    pub role: Role,
}

/// Partial update for an account (admin only)
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountPatch {
    /// New username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// New plaintext password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// New role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Typed client over the Taskdeck HTTP surface
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Creates a client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            session: Session::new(),
        })
    }

    /// Read access to the session for UI state decisions
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in and stores the returned token in the session
    ///
    /// # Errors
    ///
    /// `ClientError::Unauthorized` on bad credentials; the server's
    /// response does not reveal whether the username or password was
    /// wrong.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Identity, ClientError> {
        let url = self.join("/auth/login")?;

        let response = self
            .http
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = check_response(response).await?;
        let body: LoginResponse = response.json().await?;

        let identity = self.session.log_in(body.access_token)?.clone();

        tracing::debug!(username = %identity.username, "Logged in");
        Ok(identity)
    }

    /// Discards the session token
    ///
    /// Purely client-side; the server holds no session to destroy.
    pub fn log_out(&mut self) {
        self.session.log_out();
    }

    /// Lists tasks visible to the current identity
    pub async fn list_tasks(&mut self) -> Result<Vec<Task>, ClientError> {
        self.request_json(Method::GET, "/tasks", None::<&()>).await
    }

    /// Fetches one task by ID
    pub async fn get_task(&mut self, id: Uuid) -> Result<Task, ClientError> {
        self.request_json(Method::GET, &format!("/tasks/{}", id), None::<&()>)
            .await
    }

    /// Creates a task owned by the current identity
    pub async fn create_task(&mut self, draft: &TaskDraft) -> Result<Task, ClientError> {
        self.request_json(Method::POST, "/tasks", Some(draft)).await
    }

    /// Applies a partial update to a task
    pub async fn update_task(&mut self, id: Uuid, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.request_json(Method::PUT, &format!("/tasks/{}", id), Some(patch))
            .await
    }

    /// Deletes a task
    pub async fn delete_task(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.request_empty(Method::DELETE, &format!("/tasks/{}", id))
            .await
    }

    /// Lists accounts (admin only)
    pub async fn list_users(&mut self) -> Result<Vec<Account>, ClientError> {
        self.request_json(Method::GET, "/users", None::<&()>).await
    }

    /// Fetches one account by ID (admin only)
    pub async fn get_user(&mut self, id: Uuid) -> Result<Account, ClientError> {
        self.request_json(Method::GET, &format!("/users/{}", id), None::<&()>)
            .await
    }

    /// Creates an account (admin only)
    pub async fn create_user(&mut self, draft: &AccountDraft) -> Result<Account, ClientError> {
        self.request_json(Method::POST, "/users", Some(draft)).await
    }

    /// Applies a partial update to an account (admin only)
    pub async fn update_user(
        &mut self,
        id: Uuid,
        patch: &AccountPatch,
    ) -> Result<Account, ClientError> {
        self.request_json(Method::PUT, &format!("/users/{}", id), Some(patch))
            .await
    }

    /// Deletes an account and its tasks (admin only)
    pub async fn delete_user(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.request_empty(Method::DELETE, &format!("/users/{}", id))
            .await
    }

    fn join(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Returns the bearer token, observing expiry lazily
    ///
    /// An expired token is discarded here (Expired -> Anonymous), exactly
    /// when it is next needed, and the caller gets `SessionExpired` once.
    fn bearer(&mut self) -> Result<String, ClientError> {
        match self.session.state() {
            SessionState::Anonymous => Err(ClientError::NotAuthenticated),
            SessionState::Expired => {
                tracing::debug!("Discarding expired token");
                self.session.log_out();
                Err(ClientError::SessionExpired)
            }
            SessionState::Authenticated => Ok(self
                .session
                .token()
                .expect("Authenticated session holds a token")
                .to_string()),
        }
    }

    async fn request_json<B, T>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        Ok(response.json().await?)
    }

    async fn request_empty(&mut self, method: Method, path: &str) -> Result<(), ClientError> {
        self.send::<()>(method, path, None).await?;
        Ok(())
    }

    async fn send<B>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.bearer()?;
        let url = self.join(path)?;

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        check_response(request.send().await?).await
    }
}

/// Maps an error status onto the client taxonomy
fn error_for_status(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Turns a non-success response into the matching error
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|b| b.message)
        .unwrap_or_default();

    Err(error_for_status(status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(ApiClient::new("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_bearer_requires_login() {
        let mut client = ApiClient::new("http://localhost:8080").unwrap();

        assert!(matches!(
            client.bearer(),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_expired_session_is_discarded_on_use() {
        use chrono::Duration;
        use taskdeck_shared::auth::jwt::TokenIssuer;
        use taskdeck_shared::models::account::{Account, Role};

        let issuer = TokenIssuer::new("test-secret-key-at-least-32-bytes-long", Duration::hours(1));
        let token = issuer
            .issue_expired(&Account {
                id: Uuid::new_v4(),
                username: "alice".to_string(),
                password_hash: String::new(),
                role: Role::User,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            })
            .unwrap();

        let mut client = ApiClient::new("http://localhost:8080").unwrap();
        client.session.log_in(token).unwrap();

        // First use observes the expiry and discards the token
        assert!(matches!(client.bearer(), Err(ClientError::SessionExpired)));

        // Afterwards the session is anonymous again
        assert!(matches!(
            client.bearer(),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, String::new()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, String::new()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, String::new()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, String::new()),
            ClientError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            ClientError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_task_draft_serializes_camel_case_without_owner() {
        let draft = TaskDraft {
            title: "t".to_string(),
            description: "d".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            status: None,
            priority: Some(TaskPriority::High),
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["dueDate"], "2025-07-01");
        assert_eq!(json["priority"], "High");
        assert!(json.get("status").is_none());
        assert!(json.get("ownerId").is_none());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let patch = TaskPatch::default();
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
