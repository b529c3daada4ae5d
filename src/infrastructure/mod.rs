//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Http/Backend: League backend REST client
//! - Adapters: Platform integrations (Discord, console)
//! - Heartbeat: Uptime monitor pings
//! - Relay: Webhook forwarder

pub mod adapters;
pub mod backend;
pub mod config;
pub mod heartbeat;
pub mod http;
pub mod relay;
