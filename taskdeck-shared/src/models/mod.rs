/// Database models for Taskdeck
///
/// # Models
///
/// - `account`: credential store with usernames, password hashes, and roles
/// - `task`: owned work items scoped by the access policy

pub mod account;
pub mod task;
