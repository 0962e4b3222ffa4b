//! # Domain Layer
//!
//! The domain layer contains the core business entities of the messaging
//! service, independent of framework and infrastructure concerns.
//!
//! - **entities**: User, Channel, Message, Session plus repository traits
//!
//! Repository traits define data access contracts; entities encapsulate
//! the invariants the stores cannot see alone (depletion threshold,
//! reserved channel, system author).

pub mod entities;

pub use entities::*;
