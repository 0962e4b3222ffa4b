//! # Relay Server Library
//!
//! This crate provides a session-authenticated messaging server with:
//! - RESTful HTTP API endpoints
//! - A user directory with a friend/block relationship graph
//! - Multi-user channels with append-only message logs
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database and session store implementations
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! relay_server/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, repositories, and sessions
//! +-- presentation/  HTTP routes, handlers, and middleware
//! +-- shared/        Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers and middleware
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
