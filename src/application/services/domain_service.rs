//! Domain Service (composition root)
//!
//! The only component that calls into more than one of the user
//! directory and channel registry per operation. Owns the cross-entity
//! effects: the "Global" join on registration and the channel-membership
//! cascade on user deletion.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::services::channel_service::{ChannelError, ChannelService};
use crate::application::services::user_service::{UserError, UserService};
use crate::domain::{Channel, ChannelRepository, User, GLOBAL_CHANNEL};
use crate::shared::error::AppError;

/// Composition-root trait
#[async_trait]
pub trait DomainService: Send + Sync {
    /// Register a user, then join them to the reserved "Global" channel.
    async fn register_user(&self, name: &str, password: &str) -> Result<User, DomainError>;

    /// Delete a user and cascade the removal through every channel they
    /// belong to, applying the depletion rule per channel.
    async fn delete_user(&self, name: &str) -> Result<(), DomainError>;

    /// Append a message on behalf of an authenticated member.
    async fn post_message(
        &self,
        channel_id: Uuid,
        acting_user: &str,
        content: &str,
    ) -> Result<Channel, DomainError>;
}

/// Composition-root errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The user record was created but the "Global" join failed and the
    /// record was compensated away; the whole registration can be
    /// retried.
    #[error("Registration could not be completed, retry")]
    RegistrationIncomplete,

    /// The deletion cascade finished with failures; the listed channels
    /// still reference the user and the operation can be retried.
    #[error("User deleted but {} channel(s) failed to update: {failed:?}", failed.len())]
    CascadeIncomplete { failed: Vec<Uuid> },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let msg = err.to_string();
        match err {
            DomainError::User(e) => e.into(),
            DomainError::Channel(e) => e.into(),
            DomainError::RegistrationIncomplete | DomainError::CascadeIncomplete { .. } => {
                AppError::Unavailable(msg)
            }
            DomainError::Store(e) => e,
        }
    }
}

/// DomainService implementation composing the two single-entity
/// services. The channel repository is held directly for the cascade
/// enumeration, which needs unscoped channel access.
pub struct DomainServiceImpl<S, CS, C>
where
    S: UserService,
    CS: ChannelService,
    C: ChannelRepository,
{
    users: Arc<S>,
    channels: Arc<CS>,
    channel_repo: Arc<C>,
}

impl<S, CS, C> DomainServiceImpl<S, CS, C>
where
    S: UserService,
    CS: ChannelService,
    C: ChannelRepository,
{
    pub fn new(users: Arc<S>, channels: Arc<CS>, channel_repo: Arc<C>) -> Self {
        Self {
            users,
            channels,
            channel_repo,
        }
    }
}

#[async_trait]
impl<S, CS, C> DomainService for DomainServiceImpl<S, CS, C>
where
    S: UserService + 'static,
    CS: ChannelService + 'static,
    C: ChannelRepository + 'static,
{
    async fn register_user(&self, name: &str, password: &str) -> Result<User, DomainError> {
        let user = self.users.register(name, password).await?;

        let joined = match self.channel_repo.find_by_name(GLOBAL_CHANNEL).await {
            Ok(Some(global)) => self.channels.admit(global.id, name).await.map(|_| ()),
            Ok(None) => Err(ChannelError::NotFound),
            Err(e) => Err(ChannelError::Store(e)),
        };

        if let Err(e) = joined {
            tracing::error!(user = %name, error = %e, "Global join failed, compensating");
            // Compensate so a retry of the whole registration can
            // succeed. A failed compensation leaves the user without
            // Global membership; the retry then reports the conflict.
            if let Err(e) = self.users.remove(name).await {
                tracing::error!(user = %name, error = %e, "Compensation failed");
            }
            return Err(DomainError::RegistrationIncomplete);
        }

        Ok(user)
    }

    async fn delete_user(&self, name: &str) -> Result<(), DomainError> {
        self.users.remove(name).await?;

        let memberships = self.channel_repo.list_for_member(name).await?;
        let mut failed: Vec<Uuid> = Vec::new();

        for summary in memberships {
            match self.channels.leave(summary.id, name).await {
                Ok(_) => {}
                // Already removed (e.g. an earlier retry of this
                // cascade): an idempotent no-op, not an error.
                Err(ChannelError::NotMember) | Err(ChannelError::NotFound) => {}
                Err(e) => {
                    tracing::error!(
                        channel = %summary.id,
                        user = %name,
                        error = %e,
                        "Cascade step failed"
                    );
                    failed.push(summary.id);
                }
            }
        }

        if !failed.is_empty() {
            return Err(DomainError::CascadeIncomplete { failed });
        }

        Ok(())
    }

    async fn post_message(
        &self,
        channel_id: Uuid,
        acting_user: &str,
        content: &str,
    ) -> Result<Channel, DomainError> {
        Ok(self.channels.post(channel_id, acting_user, content).await?)
    }
}
