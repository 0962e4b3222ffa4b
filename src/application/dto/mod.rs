//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    AddUserRequest, CreateChannelRequest, CreateUserRequest, DeleteChannelRequest,
    DeleteUserRequest, GetChannelQuery, GetUserQuery, LeaveChannelRequest, LoginRequest,
    PostMessageRequest, UpdateRelationshipRequest,
};
pub use response::{
    AckResponse, ChannelResponse, ChannelSummaryResponse, CreateChannelResponse, IsAuthResponse,
    MessageResponse, SessionResponse, UserResponse,
};
