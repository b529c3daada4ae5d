//! Domain traits - Abstractions for infrastructure implementations

pub mod backend;
pub mod platform;

pub use backend::Backend;
pub use platform::ChatPlatform;
