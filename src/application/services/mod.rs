//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **CredentialHasher**: password hashing and verification
//! - **AuthService**: the session gate (login, logout, token resolution)
//! - **UserService**: the user directory and relationship graph
//! - **ChannelService**: the channel registry and message log
//! - **DomainService**: cross-entity orchestration (cascades)

pub mod auth_service;
pub mod channel_service;
pub mod credential;
pub mod domain_service;
pub mod user_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl};
pub use channel_service::{
    ChannelError, ChannelService, ChannelServiceImpl, RemovalOutcome,
};
pub use credential::{CredentialError, CredentialHasher};
pub use domain_service::{DomainError, DomainService, DomainServiceImpl};
pub use user_service::{UserError, UserService, UserServiceImpl};
