/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: login endpoint
/// - `tasks`: task CRUD, scoped by the access policy
/// - `users`: account management (admin only)

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
