//! Session Gate
//!
//! Login, logout, and token-to-identity resolution. Every protected
//! operation resolves its caller here exactly once; downstream
//! components receive an explicit `Identity` value.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::credential::CredentialHasher;
use crate::domain::{Identity, Session, User, UserRepository};
use crate::infrastructure::sessions::SessionStore;
use crate::shared::error::AppError;

/// Session gate trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and establish a session.
    async fn login(&self, name: &str, password: &str) -> Result<Session, AuthError>;

    /// Invalidate a token. Tolerant: succeeds for absent tokens too.
    async fn logout(&self, token: &str);

    /// Resolve a token to the authenticated identity.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;

    /// Fetch the full record of the logged-in user.
    async fn current_user(&self, token: &str) -> Result<User, AuthError>;
}

/// Session gate errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login attempted for a name that is not registered. Distinct from
    /// a password mismatch by contract.
    #[error("User not found")]
    UserNotFound,

    #[error("Mismatched password")]
    InvalidCredentials,

    #[error("No active session. Please login")]
    Unauthenticated,

    #[error("Credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let msg = err.to_string();
        match err {
            AuthError::UserNotFound => AppError::NotFound(msg),
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                AppError::Unauthorized(msg)
            }
            AuthError::Credential(_) => AppError::Internal(msg),
            AuthError::Store(e) => e,
        }
    }
}

/// AuthService implementation over the user store and the in-process
/// session store.
pub struct AuthServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    sessions: Arc<SessionStore>,
    credentials: Arc<CredentialHasher>,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        sessions: Arc<SessionStore>,
        credentials: Arc<CredentialHasher>,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            credentials,
        }
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn login(&self, name: &str, password: &str) -> Result<Session, AuthError> {
        let user = self
            .user_repo
            .find_by_name(name)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let valid = self
            .credentials
            .verify(password, &user.password_hash)
            .map_err(|e| AuthError::Credential(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user = %user.name, "Session established");
        Ok(self.sessions.issue(&user.name))
    }

    async fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.sessions
            .resolve(token)
            .ok_or(AuthError::Unauthenticated)
    }

    async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let identity = self.authenticate(token).await?;

        self.user_repo
            .find_by_name(&identity.name)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
