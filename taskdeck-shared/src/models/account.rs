/// Account model and database operations
///
/// This module provides the Account model and CRUD operations for the
/// credential store. Accounts carry the role used for every authorization
/// decision; passwords are stored as Argon2id hashes, never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE account_role AS ENUM ('admin', 'user');
///
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role account_role NOT NULL DEFAULT 'user',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::account::{Account, CreateAccount, Role};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let account = Account::create(&pool, CreateAccount {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
/// }).await?;
///
/// let found = Account::find_by_username(&pool, "alice").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account role used for role-based access control
///
/// Admins may access any task and manage accounts; regular users are
/// restricted to tasks they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to all tasks and account management
    Admin,

    /// Access restricted to owned tasks
    User,
}

impl Role {
    /// Converts role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Checks whether this role grants administrative access
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Account model representing a user of the system
///
/// The password hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account ID (UUID v4), immutable after creation
    pub id: Uuid,

    /// Username, unique across all accounts
    pub username: String,

    /// Argon2id password hash (PHC string format)
    ///
    /// Skipped on serialization so it can never leak into an API response;
    /// defaulted on deserialization so clients can parse responses that
    /// (correctly) omit it.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Role used for authorization decisions
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Username (must be unique)
    pub username: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Initial role
    pub role: Role,
}

/// Input for updating an existing account
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    /// New username
    pub username: Option<String>,

    /// New password hash (callers hash the replacement password first)
    pub password_hash: Option<String>,

    /// New role
    pub role: Option<Role>,
}

impl Account {
    /// Creates a new account
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint)
    /// or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by username
    ///
    /// Used during login to look up the credential record. Returns None for
    /// unknown usernames; the caller is responsible for collapsing that case
    /// into the same error as a failed password check.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Lists accounts with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM accounts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Updates an existing account
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed. Returns None if the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the new username collides with another account
    /// or the database operation fails.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateAccount,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE accounts SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, username, password_hash, role, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Account>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        let account = q.fetch_optional(pool).await?;

        Ok(account)
    }

    /// Deletes an account by ID
    ///
    /// Tasks owned by the account are removed as well (ON DELETE CASCADE).
    ///
    /// # Returns
    ///
    /// True if the account was deleted, false if it did not exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_account_never_serializes_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"username\":\"alice\""));
    }

    #[test]
    fn test_update_account_default() {
        let update = UpdateAccount::default();
        assert!(update.username.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.role.is_none());
    }

    // Integration tests for database operations require a running Postgres
    // and live in the API crate's test suite.
}
