//! # Taskdeck Client Library
//!
//! Client-side counterpart to the Taskdeck API: session state (token plus
//! the identity decoded from it) and a typed HTTP client over the whole
//! surface. A UI embeds this crate and renders off [`session::Session`]
//! rather than talking HTTP directly.
//!
//! ## Modules
//!
//! - `session`: token storage, derived identity, lazy expiry detection
//! - `client`: typed reqwest wrapper with the client error taxonomy
//!
//! ## Example
//!
//! ```no_run
//! use taskdeck_client::client::ApiClient;
//! use taskdeck_client::session::SessionState;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = ApiClient::new("http://localhost:8080")?;
//! client.login("alice", "password123!").await?;
//!
//! if client.session().is_admin() {
//!     let users = client.list_users().await?;
//!     println!("{} accounts", users.len());
//! }
//!
//! client.log_out();
//! assert_eq!(client.session().state(), SessionState::Anonymous);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod session;

/// Current version of the Taskdeck client library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
