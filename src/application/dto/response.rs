//! Response DTOs
//!
//! Data structures for API response bodies. Credential material never
//! appears in any response.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Channel, ChannelSummary, Message, Session, User};

/// User record response (no credential)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub name: String,
    pub friends: Vec<String>,
    pub blocked: Vec<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            friends: user.friends,
            blocked: user.blocked,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Session established on login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: String,
    pub created_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user,
            created_at: session.created_at.to_rfc3339(),
        }
    }
}

/// Channel response including the message log
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<String>,
    pub messages: Vec<MessageResponse>,
    pub created_at: String,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            members: channel.members,
            messages: channel.messages.into_iter().map(MessageResponse::from).collect(),
            created_at: channel.created_at.to_rfc3339(),
        }
    }
}

/// Channel listing entry without message bodies
#[derive(Debug, Serialize)]
pub struct ChannelSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<String>,
    pub created_at: String,
}

impl From<ChannelSummary> for ChannelSummaryResponse {
    fn from(summary: ChannelSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            members: summary.members,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

/// One message log entry
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub author: String,
    pub content: String,
    pub sent_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            author: message.author,
            content: message.content,
            sent_at: message.sent_at.to_rfc3339(),
        }
    }
}

/// Channel creation result
#[derive(Debug, Serialize)]
pub struct CreateChannelResponse {
    pub id: Uuid,
}

/// Simple human-readable acknowledgement
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: String,
}

impl AckResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Auth probe response
#[derive(Debug, Serialize)]
pub struct IsAuthResponse {
    pub ok: bool,
}
