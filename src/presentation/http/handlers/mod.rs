//! HTTP Request Handlers

pub mod health;
pub mod messaging;
pub mod user;
