//! Infrastructure Layer
//!
//! Contains implementations for external collaborators:
//! - Database repositories (PostgreSQL)
//! - The in-process session store

pub mod database;
pub mod repositories;
pub mod sessions;
