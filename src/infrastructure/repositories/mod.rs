//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.
//!
//! - **UserRepository** - user accounts and the relationship graph
//! - **ChannelRepository** - channels, membership, and the message log

pub mod channel_repository;
pub mod user_repository;

pub use channel_repository::PgChannelRepository;
pub use user_repository::PgUserRepository;
