//! Interaction handling - Event-driven command and component processing

pub mod components;
pub mod dispatcher;
pub mod parser;

pub use components::ReviewDecision;
pub use dispatcher::{InteractionDispatcher, ERROR_REPLY};
pub use parser::MessageParser;
