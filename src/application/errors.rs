//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Duplicate command: {0}")]
    DuplicateCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl From<BotError> for CommandError {
    fn from(err: BotError) -> Self {
        match err {
            BotError::Fetch(e) => CommandError::Fetch(e),
            BotError::Command(e) => e,
            other => CommandError::Platform(other.to_string()),
        }
    }
}

/// Backend fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection-level failure or a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// Body was not JSON or did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Cron schedule errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}
