use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandRegistry, Invocation, Reply};

/// Service for looking up and executing registered commands
#[derive(Clone)]
pub struct CommandService {
    registry: Arc<CommandRegistry>,
    ctx: CommandContext,
}

impl CommandService {
    pub fn new(registry: Arc<CommandRegistry>, ctx: CommandContext) -> Self {
        Self { registry, ctx }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.registry.get(name)
    }

    /// Run the handler registered under the invocation's command name.
    pub async fn dispatch(&self, invocation: &Invocation) -> Result<Reply, CommandError> {
        let cmd = self
            .registry
            .get(&invocation.command)
            .ok_or_else(|| CommandError::UnknownCommand(invocation.command.clone()))?;

        tracing::debug!(command = %cmd.name, user = %invocation.user.id, "dispatching command");
        cmd.handler.execute(&self.ctx, invocation).await
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            if let Some(cmd) = self.registry.get(name) {
                let mut help = format!("/{} - {}", cmd.name, cmd.description);
                for opt in &cmd.options {
                    let marker = if opt.required { "" } else { " (optional)" };
                    help.push_str(&format!("\n  {}: {}{}", opt.name, opt.description, marker));
                }
                return help;
            }
            return format!("Command /{} not found", name);
        }

        let mut help = "Available commands:\n".to_string();
        for cmd in self.registry.all() {
            help.push_str(&format!("  /{} - {}\n", cmd.name, cmd.description));
        }
        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::entities::{CommandHandler, CommandOption};
    use crate::testing::{member, RecordingPlatform, StaticBackend};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl CommandHandler for Counting {
        async fn execute(&self, _ctx: &CommandContext, _inv: &Invocation) -> Result<Reply, CommandError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::public("counted"))
        }
    }

    fn service(calls: Arc<AtomicUsize>) -> CommandService {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                Command::new("count", Counting(calls))
                    .with_description("Count invocations")
                    .with_option(CommandOption::string("label", "What to count")),
            )
            .unwrap();
        let ctx = CommandContext::new(Arc::new(RecordingPlatform::new()), Arc::new(StaticBackend::default()));
        CommandService::new(Arc::new(registry), ctx)
    }

    #[tokio::test]
    async fn dispatch_runs_the_matching_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let reply = service
            .dispatch(&Invocation::new("count", member(), "chan"))
            .await
            .unwrap();

        assert_eq!(reply, Reply::public("counted"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_command_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let err = service
            .dispatch(&Invocation::new("nope", member(), "chan"))
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::UnknownCommand(name) if name == "nope"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn help_lists_options() {
        let service = service(Arc::new(AtomicUsize::new(0)));
        let help = service.get_help(Some("count"));
        assert!(help.starts_with("/count - Count invocations"));
        assert!(help.contains("label: What to count (optional)"));
        assert_eq!(service.get_help(Some("missing")), "Command /missing not found");
    }
}
