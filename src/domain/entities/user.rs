//! User entity and repository trait.
//!
//! Maps to the `users` table: the user's name is the primary key, and the
//! friend/block relationship graph is stored as two text arrays on the row
//! so a single conditional UPDATE can mutate it atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Relationship-graph transition verbs.
///
/// Wire values match the request body (`addFriend`, `removeFriend`,
/// `block`, `unblock`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipAction {
    AddFriend,
    RemoveFriend,
    Block,
    Unblock,
}

impl RelationshipAction {
    /// Whether this action grows the relationship set (as opposed to
    /// shrinking it).
    pub fn is_addition(&self) -> bool {
        matches!(self, Self::AddFriend | Self::Block)
    }

    /// The relationship set this action operates on.
    pub fn target_list(&self) -> &'static str {
        match self {
            Self::AddFriend | Self::RemoveFriend => "friends",
            Self::Block | Self::Unblock => "blocked",
        }
    }
}

impl std::fmt::Display for RelationshipAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AddFriend => "addFriend",
            Self::RemoveFriend => "removeFriend",
            Self::Block => "block",
            Self::Unblock => "unblock",
        };
        write!(f, "{}", s)
    }
}

/// Represents a registered user account.
///
/// Maps to the `users` table:
/// - name: TEXT PRIMARY KEY (non-empty, immutable)
/// - password_hash: TEXT NOT NULL (argon2, never serialized)
/// - friends: TEXT[] NOT NULL DEFAULT '{}'
/// - blocked: TEXT[] NOT NULL DEFAULT '{}'
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user name (primary key)
    pub name: String,

    /// Argon2 password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Names of users this user has befriended
    pub friends: Vec<String>,

    /// Names of users this user has blocked
    pub blocked: Vec<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user record with empty relationship sets.
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: password_hash.into(),
            friends: Vec::new(),
            blocked: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Check whether `other` is currently in this user's friends list.
    pub fn is_friend(&self, other: &str) -> bool {
        self.friends.iter().any(|n| n == other)
    }

    /// Check whether `other` is currently in this user's blocked list.
    pub fn has_blocked(&self, other: &str) -> bool {
        self.blocked.iter().any(|n| n == other)
    }
}

/// Repository trait for User data access operations.
///
/// Relationship mutations are conditional, single-row updates: the
/// presence predicate is evaluated by the store, not in memory, so two
/// concurrent identical requests cannot both apply.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Create a new user. Fails with `Conflict` when the name is taken.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user by name. Fails with `NotFound` when absent.
    async fn delete(&self, name: &str) -> Result<(), AppError>;

    /// List all registered user names (never credentials).
    async fn list_names(&self) -> Result<Vec<String>, AppError>;

    /// Check that a name is registered.
    async fn name_exists(&self, name: &str) -> Result<bool, AppError>;

    /// Apply a relationship transition for `acting` against `target`.
    ///
    /// Returns the updated user, or `None` when the store-side predicate
    /// rejected the transition (duplicate addition or absent removal).
    async fn update_relationship(
        &self,
        acting: &str,
        action: RelationshipAction,
        target: &str,
    ) -> Result<Option<User>, AppError>;
}
