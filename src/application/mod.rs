//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Commands: Slash command handlers
//! - Services: Command dispatch and permission checks
//! - Messaging: Interaction routing and console line parsing
//! - Scheduler: Cron schedules and timed announcements
//! - Errors: Domain-specific errors

pub mod commands;
pub mod errors;
pub mod messaging;
pub mod scheduler;
pub mod services;
