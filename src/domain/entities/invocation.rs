use super::{Permissions, User};
use crate::application::errors::CommandError;

/// A single slash-command invocation.
///
/// Created per inbound event and dropped once the handler returns.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Interaction id and token; both are needed to answer it.
    pub id: String,
    pub token: String,
    pub command: String,
    pub user: User,
    pub permissions: Permissions,
    /// Supplied option values in the order the platform sent them.
    pub options: Vec<(String, String)>,
    pub channel_id: String,
    pub guild_id: Option<String>,
}

impl Invocation {
    pub fn new(command: impl Into<String>, user: User, channel_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token: String::new(),
            command: command.into(),
            user,
            permissions: Permissions::empty(),
            options: Vec::new(),
            channel_id: channel_id.into(),
            guild_id: None,
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Fetch a required option, failing with `InvalidArgs` when absent or blank.
    pub fn required_option(&self, name: &str) -> Result<&str, CommandError> {
        match self.option(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(CommandError::InvalidArgs(format!(
                "/{} requires option '{}'",
                self.command, name
            ))),
        }
    }
}

/// A press on a message component (button).
#[derive(Debug, Clone)]
pub struct ComponentPress {
    pub id: String,
    pub token: String,
    pub custom_id: String,
    pub user: User,
    pub channel_id: String,
}

/// Inbound interaction routed by the dispatcher.
#[derive(Debug, Clone)]
pub enum Interaction {
    Command(Invocation),
    Component(ComponentPress),
}

impl Interaction {
    pub fn id(&self) -> &str {
        match self {
            Interaction::Command(inv) => &inv.id,
            Interaction::Component(press) => &press.id,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Interaction::Command(inv) => &inv.token,
            Interaction::Component(press) => &press.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_option_rejects_missing_and_blank() {
        let inv = Invocation::new("flag", User::new("1", "mod"), "chan")
            .with_option("id", "   ");
        assert!(matches!(inv.required_option("id"), Err(CommandError::InvalidArgs(_))));
        assert!(matches!(inv.required_option("other"), Err(CommandError::InvalidArgs(_))));

        let inv = Invocation::new("flag", User::new("1", "mod"), "chan")
            .with_option("id", "abc123");
        assert_eq!(inv.required_option("id").unwrap(), "abc123");
    }
}
