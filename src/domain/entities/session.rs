//! Session and identity types.
//!
//! Sessions are ephemeral, process-local records binding an opaque token
//! to an authenticated identity. They are not persisted beyond the
//! process lifetime.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The authenticated caller, resolved once per request by the session
/// gate and threaded through component calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The authenticated user's name
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A live session as handed back to the client on login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Opaque server-issued token
    pub token: String,

    /// Name of the authenticated user
    pub user: String,

    /// When the session was established
    pub created_at: DateTime<Utc>,
}
