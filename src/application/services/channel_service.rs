//! Channel Registry Service
//!
//! Owns channel identity, the membership set, the append-only message
//! log, and the auto-delete-on-depletion lifecycle rule. Every read is
//! scoped to the requesting member.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Channel, ChannelRepository, ChannelSummary, Message, UserRepository, GLOBAL_CHANNEL,
};
use crate::shared::error::AppError;

/// Channel registry trait
#[async_trait]
pub trait ChannelService: Send + Sync {
    /// Create a channel from a non-empty set of existing users.
    async fn create(&self, name: &str, members: &[String]) -> Result<Channel, ChannelError>;

    /// Fetch a channel with its message log; non-members observe
    /// `NotFound` so membership never leaks.
    async fn get(&self, requester: &str, id: Uuid) -> Result<Channel, ChannelError>;

    /// List the channels the requester belongs to.
    async fn list_for(&self, requester: &str) -> Result<Vec<ChannelSummary>, ChannelError>;

    /// Add `user` to a channel on behalf of `actor` (who must be a
    /// member), appending the join notice.
    async fn join(&self, id: Uuid, actor: &str, user: &str) -> Result<Channel, ChannelError>;

    /// Server-driven membership add with no acting member (used for the
    /// reserved "Global" join on registration).
    async fn admit(&self, id: Uuid, user: &str) -> Result<Channel, ChannelError>;

    /// Remove `user` from a channel, applying the depletion rule.
    async fn leave(&self, id: Uuid, user: &str) -> Result<RemovalOutcome, ChannelError>;

    /// Append a user-authored message; membership is enforced by the
    /// same statement that appends.
    async fn post(&self, id: Uuid, author: &str, content: &str) -> Result<Channel, ChannelError>;

    /// Explicitly delete a channel. The reserved "Global" channel is
    /// refused.
    async fn delete(&self, id: Uuid) -> Result<(), ChannelError>;
}

/// What a membership removal did to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    /// The member left; the channel survives with the returned state.
    Left(Channel),
    /// Membership depleted and the channel was deleted.
    Deleted,
}

/// Channel registry errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Covers both an absent channel and a requester outside the
    /// membership set.
    #[error("Channel doesn't exist")]
    NotFound,

    #[error("User {0} doesn't exist")]
    UserNotFound(String),

    #[error("User is already a member")]
    AlreadyMember,

    #[error("User is not a member")]
    NotMember,

    #[error("Invalid request parameters: {0}")]
    Validation(String),

    #[error("The {GLOBAL_CHANNEL} channel is reserved")]
    ReservedChannel,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ChannelError> for AppError {
    fn from(err: ChannelError) -> Self {
        let msg = err.to_string();
        match err {
            ChannelError::NotFound | ChannelError::NotMember => AppError::NotFound(msg),
            ChannelError::AlreadyMember => AppError::Conflict(msg),
            ChannelError::UserNotFound(_)
            | ChannelError::Validation(_)
            | ChannelError::ReservedChannel => AppError::Validation(msg),
            ChannelError::Store(e) => e,
        }
    }
}

/// ChannelService implementation
pub struct ChannelServiceImpl<C, U>
where
    C: ChannelRepository,
    U: UserRepository,
{
    channel_repo: Arc<C>,
    user_repo: Arc<U>,
}

impl<C, U> ChannelServiceImpl<C, U>
where
    C: ChannelRepository,
    U: UserRepository,
{
    pub fn new(channel_repo: Arc<C>, user_repo: Arc<U>) -> Self {
        Self {
            channel_repo,
            user_repo,
        }
    }

    /// Depletion handling shared by `leave` and the deletion cascade:
    /// delete when below threshold, otherwise append the leave notice.
    async fn settle_after_removal(
        &self,
        id: Uuid,
        user: &str,
        channel: Channel,
    ) -> Result<RemovalOutcome, ChannelError> {
        if channel.is_depleted() {
            // The predicate re-runs store-side; a concurrent join keeps
            // the channel alive and we fall through to the notice.
            if self.channel_repo.delete_if_depleted(id).await? {
                tracing::info!(channel = %id, "Channel depleted, deleted");
                return Ok(RemovalOutcome::Deleted);
            }
        }

        match self
            .channel_repo
            .append_system_message(id, &Message::leave_notice(user))
            .await?
        {
            Some(updated) => Ok(RemovalOutcome::Left(updated)),
            // Vanished between the removal and the notice: treat as
            // deleted rather than erroring the caller.
            None => Ok(RemovalOutcome::Deleted),
        }
    }
}

#[async_trait]
impl<C, U> ChannelService for ChannelServiceImpl<C, U>
where
    C: ChannelRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create(&self, name: &str, members: &[String]) -> Result<Channel, ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::Validation("Name must be provided".into()));
        }
        // A user-created "Global" would inherit the reserved channel's
        // exemptions (undeletable, never depletes) and could capture
        // registration joins via the name lookup.
        if name == GLOBAL_CHANNEL {
            return Err(ChannelError::ReservedChannel);
        }
        if members.is_empty() {
            return Err(ChannelError::Validation(
                "Members must be a non-empty list".into(),
            ));
        }

        // Treat the member list as a set.
        let mut unique: Vec<String> = Vec::with_capacity(members.len());
        for member in members {
            if !unique.contains(member) {
                unique.push(member.clone());
            }
        }

        for member in &unique {
            if !self.user_repo.name_exists(member).await? {
                return Err(ChannelError::UserNotFound(member.clone()));
            }
        }

        let channel = Channel::new(name, unique);
        tracing::info!(channel = %channel.id, name = %name, "Creating channel");
        Ok(self.channel_repo.create(&channel).await?)
    }

    async fn get(&self, requester: &str, id: Uuid) -> Result<Channel, ChannelError> {
        self.channel_repo
            .find_for_member(requester, id)
            .await?
            .ok_or(ChannelError::NotFound)
    }

    async fn list_for(&self, requester: &str) -> Result<Vec<ChannelSummary>, ChannelError> {
        Ok(self.channel_repo.list_for_member(requester).await?)
    }

    async fn join(&self, id: Uuid, actor: &str, user: &str) -> Result<Channel, ChannelError> {
        // The actor must already belong to the channel; an outsider
        // observes NotFound.
        self.channel_repo
            .find_for_member(actor, id)
            .await?
            .ok_or(ChannelError::NotFound)?;

        if !self.user_repo.name_exists(user).await? {
            return Err(ChannelError::UserNotFound(user.to_string()));
        }

        self.admit(id, user).await
    }

    async fn admit(&self, id: Uuid, user: &str) -> Result<Channel, ChannelError> {
        match self
            .channel_repo
            .add_member(id, user, &Message::join_notice(user))
            .await?
        {
            Some(channel) => Ok(channel),
            None => {
                if self.channel_repo.find_by_id(id).await?.is_none() {
                    return Err(ChannelError::NotFound);
                }
                Err(ChannelError::AlreadyMember)
            }
        }
    }

    async fn leave(&self, id: Uuid, user: &str) -> Result<RemovalOutcome, ChannelError> {
        let channel = self
            .channel_repo
            .remove_member(id, user)
            .await?
            .ok_or(ChannelError::NotMember)?;

        self.settle_after_removal(id, user, channel).await
    }

    async fn post(&self, id: Uuid, author: &str, content: &str) -> Result<Channel, ChannelError> {
        if content.is_empty() {
            return Err(ChannelError::Validation("Empty message content".into()));
        }

        self.channel_repo
            .append_user_message(id, author, &Message::new(author, content))
            .await?
            .ok_or(ChannelError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ChannelError> {
        let channel = self
            .channel_repo
            .find_by_id(id)
            .await?
            .ok_or(ChannelError::NotFound)?;

        if channel.is_global() {
            return Err(ChannelError::ReservedChannel);
        }

        tracing::info!(channel = %id, "Deleting channel");
        self.channel_repo.delete(id).await.map_err(|e| match e {
            AppError::NotFound(_) => ChannelError::NotFound,
            e => e.into(),
        })
    }
}
