//! Configuration Management
//!
//! Layered settings loaded from files and environment variables.

pub mod settings;

pub use settings::{
    CorsSettings, DatabaseSettings, ServerSettings, SessionSettings, Settings,
};
