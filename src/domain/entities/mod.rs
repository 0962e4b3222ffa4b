//! # Domain Entities
//!
//! Core entities and the repository traits that define their data access
//! contracts.

pub mod channel;
pub mod message;
pub mod session;
pub mod user;

pub use channel::{Channel, ChannelRepository, ChannelSummary, GLOBAL_CHANNEL, MIN_MEMBERS};
pub use message::{Message, SYSTEM_AUTHOR};
pub use session::{Identity, Session};
pub use user::{RelationshipAction, User, UserRepository};
