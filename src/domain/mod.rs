//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (User, Invocation, Command, Reply)
//! - Traits: Abstractions for infrastructure (ChatPlatform, Backend)

pub mod entities;
pub mod traits;
