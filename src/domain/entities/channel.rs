//! Channel entity and repository trait.
//!
//! Maps to the `channels` table. The membership set is a text array and
//! the message log a JSONB array on the same row, so membership checks,
//! membership mutation, and message appends are each a single
//! conditional statement against one document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;
use crate::shared::error::AppError;

/// Name of the reserved system channel every user joins on registration.
/// Exempt from the auto-delete-on-depletion rule.
pub const GLOBAL_CHANNEL: &str = "Global";

/// A channel's membership drops below this and the next membership
/// removal deletes the channel (except "Global").
pub const MIN_MEMBERS: usize = 2;

/// Represents a multi-user messaging channel.
///
/// Maps to the `channels` table:
/// - id: UUID PRIMARY KEY
/// - name: TEXT NOT NULL (non-empty; "Global" is reserved)
/// - members: TEXT[] NOT NULL DEFAULT '{}'
/// - messages: JSONB NOT NULL DEFAULT '[]' (append-only)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique channel identifier
    pub id: Uuid,

    /// Human label; not unique except for the reserved "Global"
    pub name: String,

    /// User names authorized to read and post
    pub members: Vec<String>,

    /// Append-only message log
    pub messages: Vec<Message>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Channel {
    /// Build a fresh channel with an empty message log.
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether this is the reserved system channel.
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_CHANNEL
    }

    /// Whether `user` is authorized to read and post here.
    pub fn has_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m == user)
    }

    /// Whether the channel has dropped below the survival threshold.
    /// "Global" never depletes.
    pub fn is_depleted(&self) -> bool {
        !self.is_global() && self.members.len() < MIN_MEMBERS
    }
}

/// Channel listing entry: identity and membership without message bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Channel data access operations.
///
/// Read access is membership-scoped at the query level: `find_for_member`
/// and `append_user_message` embed the `requester = ANY(members)`
/// predicate, so a non-member cannot distinguish "absent" from
/// "forbidden". `find_by_id` is the unscoped variant reserved for
/// server-internal orchestration.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Create a new channel.
    async fn create(&self, channel: &Channel) -> Result<Channel, AppError>;

    /// Fetch a channel (with message log) only if `member` belongs to it.
    async fn find_for_member(
        &self,
        member: &str,
        id: Uuid,
    ) -> Result<Option<Channel>, AppError>;

    /// Fetch a channel without membership scoping (internal use).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError>;

    /// Find the reserved channel with the given name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Channel>, AppError>;

    /// List channels `member` belongs to, without message bodies.
    async fn list_for_member(&self, member: &str) -> Result<Vec<ChannelSummary>, AppError>;

    /// Atomically add `user` to the membership set and append `notice`.
    ///
    /// Returns `None` when the user is already a member (store-side
    /// predicate), `NotFound` via the caller when the channel is absent.
    async fn add_member(
        &self,
        id: Uuid,
        user: &str,
        notice: &Message,
    ) -> Result<Option<Channel>, AppError>;

    /// Atomically remove `user` from the membership set.
    ///
    /// Returns the post-removal channel, or `None` when the user was not
    /// a member.
    async fn remove_member(&self, id: Uuid, user: &str) -> Result<Option<Channel>, AppError>;

    /// Delete the channel iff its membership has depleted and it is not
    /// "Global". Returns whether a deletion happened.
    async fn delete_if_depleted(&self, id: Uuid) -> Result<bool, AppError>;

    /// Atomically append a user message iff `author` is a member.
    async fn append_user_message(
        &self,
        id: Uuid,
        author: &str,
        message: &Message,
    ) -> Result<Option<Channel>, AppError>;

    /// Append a server-generated notice without membership scoping.
    async fn append_system_message(
        &self,
        id: Uuid,
        message: &Message,
    ) -> Result<Option<Channel>, AppError>;

    /// Explicitly delete a channel. Fails with `NotFound` when absent.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
