use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Invocation, Permissions, Reply, Visibility};
use crate::application::errors::CommandError;
use crate::domain::traits::{Backend, ChatPlatform};

/// Collaborators a handler may reach during one invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub platform: Arc<dyn ChatPlatform>,
    pub backend: Arc<dyn Backend>,
}

impl CommandContext {
    pub fn new(platform: Arc<dyn ChatPlatform>, backend: Arc<dyn Backend>) -> Self {
        Self { platform, backend }
    }
}

/// Command handler
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &CommandContext, invocation: &Invocation) -> Result<Reply, CommandError>;
}

/// Declared string option of a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl CommandOption {
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    pub handler: Arc<dyn CommandHandler>,
    /// Published as the default member permission when registering.
    pub permission: Option<Permissions>,
    /// Acknowledge before running the handler, with this visibility.
    pub defer: Option<Visibility>,
}

impl Command {
    pub fn new<H>(name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            options: Vec::new(),
            handler: Arc::new(handler),
            permission: None,
            defer: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_permission(mut self, permission: Permissions) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn deferred(mut self, visibility: Visibility) -> Self {
        self.defer = Some(visibility);
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("permission", &self.permission)
            .field("defer", &self.defer)
            .finish_non_exhaustive()
    }
}

/// Command registry keyed by name.
///
/// Filled once at startup, then shared read-only.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        if self.commands.contains_key(&command.name) {
            return Err(CommandError::DuplicateCommand(command.name));
        }
        self.order.push(command.name.clone());
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Commands in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
