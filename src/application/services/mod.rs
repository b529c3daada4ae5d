//! Application services - Business logic orchestration

pub mod command_service;
pub mod permission_gate;

pub use command_service::CommandService;
pub use permission_gate::{has_permission, require};
