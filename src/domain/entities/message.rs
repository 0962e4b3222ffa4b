//! Message entity.
//!
//! Messages are immutable once appended and live inside the owning
//! channel's `messages` JSONB array; append order is the only ordering
//! guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved author name for server-generated membership notices.
pub const SYSTEM_AUTHOR: &str = "System";

/// A single entry in a channel's append-only message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author user name, or `"System"` for generated notices
    pub author: String,

    /// Message text (non-empty for user messages)
    pub content: String,

    /// Append timestamp
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Build a user-authored message.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    /// Build a server-authored notice. Content is generated server-side
    /// and bypasses the user-input emptiness check.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(SYSTEM_AUTHOR, content)
    }

    /// The `"<user> has joined"` notice appended on membership add.
    pub fn join_notice(user: &str) -> Self {
        Self::system(format!("{} has joined", user))
    }

    /// The `"<user> has left"` notice appended on membership removal.
    pub fn leave_notice(user: &str) -> Self {
        Self::system(format!("{} has left", user))
    }

    /// Whether this is a server-generated notice.
    pub fn is_system(&self) -> bool {
        self.author == SYSTEM_AUTHOR
    }
}
