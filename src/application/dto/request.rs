//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::RelationshipAction;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// User deletion request
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}

/// Relationship-graph transition request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRelationshipRequest {
    pub action: RelationshipAction,

    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}

/// Lookup query for a single user
#[derive(Debug, Deserialize)]
pub struct GetUserQuery {
    pub name: String,
}

/// Create channel request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Members must be a non-empty list"))]
    pub members: Vec<String>,
}

/// Lookup query for a single channel
#[derive(Debug, Deserialize)]
pub struct GetChannelQuery {
    pub id: Uuid,
}

/// Post message request
#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageRequest {
    pub channel: Uuid,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Add a user to a channel
#[derive(Debug, Deserialize, Validate)]
pub struct AddUserRequest {
    pub channel: Uuid,

    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}

/// Leave a channel
#[derive(Debug, Deserialize)]
pub struct LeaveChannelRequest {
    pub channel: Uuid,
}

/// Delete a channel
#[derive(Debug, Deserialize)]
pub struct DeleteChannelRequest {
    pub channel: Uuid,
}
