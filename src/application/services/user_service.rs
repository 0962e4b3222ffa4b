//! User Directory Service
//!
//! Owns user identity records and the friend/block relationship graph.
//! Cross-entity effects (the "Global" join on registration, the channel
//! cascade on deletion) live in the domain service, not here.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::credential::CredentialHasher;
use crate::domain::{RelationshipAction, User, UserRepository};
use crate::shared::error::AppError;

/// User directory trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Hash the credential and store a new user with empty relationship
    /// sets.
    async fn register(&self, name: &str, password: &str) -> Result<User, UserError>;

    /// Delete the user record only; channel cascade is not this
    /// component's job.
    async fn remove(&self, name: &str) -> Result<(), UserError>;

    /// Fetch a user by name.
    async fn get_by_name(&self, name: &str) -> Result<User, UserError>;

    /// List registered user names (never credentials).
    async fn list(&self) -> Result<Vec<String>, UserError>;

    /// Apply one friend/block state-machine transition.
    async fn update_relationship(
        &self,
        acting: &str,
        action: RelationshipAction,
        target: &str,
    ) -> Result<User, UserError>;
}

/// User directory errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User doesn't exist")]
    NotFound,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Cannot target yourself")]
    SelfReference,

    #[error("User is already in your {0} list")]
    AlreadyInList(&'static str),

    #[error("User is not in your {0} list")]
    NotInList(&'static str),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let msg = err.to_string();
        match err {
            UserError::NotFound | UserError::NotInList(_) => AppError::NotFound(msg),
            UserError::AlreadyExists | UserError::AlreadyInList(_) => AppError::Conflict(msg),
            UserError::SelfReference => AppError::Validation(msg),
            UserError::Credential(_) => AppError::Internal(msg),
            UserError::Store(e) => e,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    credentials: Arc<CredentialHasher>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, credentials: Arc<CredentialHasher>) -> Self {
        Self {
            user_repo,
            credentials,
        }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn register(&self, name: &str, password: &str) -> Result<User, UserError> {
        let password_hash = self
            .credentials
            .hash(password)
            .map_err(|e| UserError::Credential(e.to_string()))?;

        let user = User::new(name, password_hash);

        tracing::info!(user = %name, "Creating new user");
        self.user_repo.create(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => UserError::AlreadyExists,
            e => e.into(),
        })
    }

    async fn remove(&self, name: &str) -> Result<(), UserError> {
        tracing::info!(user = %name, "Removing user");
        self.user_repo.delete(name).await.map_err(|e| match e {
            AppError::NotFound(_) => UserError::NotFound,
            e => e.into(),
        })
    }

    async fn get_by_name(&self, name: &str) -> Result<User, UserError> {
        self.user_repo
            .find_by_name(name)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn list(&self) -> Result<Vec<String>, UserError> {
        Ok(self.user_repo.list_names().await?)
    }

    async fn update_relationship(
        &self,
        acting: &str,
        action: RelationshipAction,
        target: &str,
    ) -> Result<User, UserError> {
        if acting == target {
            return Err(UserError::SelfReference);
        }

        if !self.user_repo.name_exists(target).await? {
            return Err(UserError::NotFound);
        }

        // The store evaluates the presence predicate inside the update;
        // `None` means the transition was rejected, not that it raced.
        match self
            .user_repo
            .update_relationship(acting, action, target)
            .await?
        {
            Some(user) => Ok(user),
            None => {
                // The acting user vanishing mid-session also yields no row.
                if !self.user_repo.name_exists(acting).await? {
                    return Err(UserError::NotFound);
                }
                if action.is_addition() {
                    Err(UserError::AlreadyInList(action.target_list()))
                } else {
                    Err(UserError::NotInList(action.target_list()))
                }
            }
        }
    }
}
