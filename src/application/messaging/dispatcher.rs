//! Interaction dispatcher - Routes inbound interactions to handlers

use std::sync::Arc;

use super::components::ReviewDecision;
use crate::application::errors::{BotError, CommandError};
use crate::application::services::CommandService;
use crate::domain::entities::{ComponentPress, Interaction, Invocation, Reply};
use crate::domain::traits::ChatPlatform;

/// Generic reply for any handler failure.
pub const ERROR_REPLY: &str = "⚠️ Error handling your request.";

/// Routes slash commands to the command service and button presses to the
/// review handler, then answers through the platform.
#[derive(Clone)]
pub struct InteractionDispatcher {
    commands: CommandService,
    platform: Arc<dyn ChatPlatform>,
}

impl InteractionDispatcher {
    pub fn new(commands: CommandService, platform: Arc<dyn ChatPlatform>) -> Self {
        Self { commands, platform }
    }

    pub fn commands(&self) -> &CommandService {
        &self.commands
    }

    /// Handle one interaction to completion.
    pub async fn handle(&self, interaction: &Interaction) -> Result<(), BotError> {
        match interaction {
            Interaction::Command(inv) => self.handle_command(interaction, inv).await,
            Interaction::Component(press) => self.handle_component(press).await,
        }
    }

    async fn handle_command(&self, interaction: &Interaction, inv: &Invocation) -> Result<(), BotError> {
        let defer = self.commands.command(&inv.command).and_then(|c| c.defer);
        if let Some(visibility) = defer {
            self.platform.defer(interaction, visibility).await?;
        }

        let reply = match self.commands.dispatch(inv).await {
            Ok(reply) => reply,
            Err(CommandError::UnknownCommand(name)) => {
                tracing::warn!(command = %name, user = %inv.user.id, "unknown command");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(
                    platform = self.platform.name(),
                    command = %inv.command,
                    user = %inv.user.id,
                    error = %e,
                    "command failed"
                );
                Reply::ephemeral(ERROR_REPLY)
            }
        };

        if defer.is_some() {
            self.platform.edit_reply(interaction, &reply).await
        } else {
            self.platform.reply(interaction, &reply).await
        }
    }

    async fn handle_component(&self, press: &ComponentPress) -> Result<(), BotError> {
        let Some(decision) = ReviewDecision::parse(&press.custom_id) else {
            tracing::debug!(custom_id = %press.custom_id, "ignoring unrecognised component");
            return Ok(());
        };

        tracing::info!(?decision, reviewer = %press.user.id, "submission reviewed");
        self.platform.update_message(press, &decision.outcome()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::commands::default_registry;
    use crate::domain::entities::{CommandContext, Permissions, Visibility};
    use crate::testing::{member, RecordingPlatform, Sent, StaticBackend};

    fn dispatcher(platform: Arc<RecordingPlatform>, backend: StaticBackend) -> InteractionDispatcher {
        let ctx = CommandContext::new(platform.clone(), Arc::new(backend));
        let commands = CommandService::new(Arc::new(default_registry().unwrap()), ctx);
        InteractionDispatcher::new(commands, platform)
    }

    #[tokio::test]
    async fn immediate_commands_reply_once() {
        let platform = Arc::new(RecordingPlatform::new());
        let inv = Invocation::new("flag", member(), "chan").with_option("id", "5");
        let id = inv.id.clone();

        dispatcher(platform.clone(), StaticBackend::default())
            .handle(&Interaction::Command(inv))
            .await
            .unwrap();

        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], Sent::Reply { interaction_id, reply } if *interaction_id == id && reply.buttons.len() == 2));
    }

    #[tokio::test]
    async fn deferred_command_failure_edits_in_generic_error() {
        let platform = Arc::new(RecordingPlatform::new());
        let inv = Invocation::new("pingmissing", member(), "chan");

        dispatcher(platform.clone(), StaticBackend::default())
            .handle(&Interaction::Command(inv.clone()))
            .await
            .unwrap();

        assert_eq!(
            platform.sent(),
            vec![
                Sent::Defer { interaction_id: inv.id.clone(), visibility: Visibility::Ephemeral },
                Sent::Edit { interaction_id: inv.id, reply: Reply::ephemeral(ERROR_REPLY) },
            ]
        );
    }

    #[tokio::test]
    async fn immediate_command_failure_replies_privately() {
        let platform = Arc::new(RecordingPlatform::new());
        let inv = Invocation::new("flag", member(), "chan");

        dispatcher(platform.clone(), StaticBackend::default())
            .handle(&Interaction::Command(inv.clone()))
            .await
            .unwrap();

        assert_eq!(
            platform.sent(),
            vec![Sent::Reply { interaction_id: inv.id, reply: Reply::ephemeral(ERROR_REPLY) }]
        );
    }

    #[tokio::test]
    async fn unknown_command_sends_nothing() {
        let platform = Arc::new(RecordingPlatform::new());
        let inv = Invocation::new("teleport", member(), "chan").with_permissions(Permissions::ADMINISTRATOR);

        dispatcher(platform.clone(), StaticBackend::default())
            .handle(&Interaction::Command(inv))
            .await
            .unwrap();

        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn review_buttons_update_the_card() {
        let platform = Arc::new(RecordingPlatform::new());
        let press = ComponentPress {
            id: "i-1".into(),
            token: "t".into(),
            custom_id: "approve_77".into(),
            user: member(),
            channel_id: "chan".into(),
        };

        let d = dispatcher(platform.clone(), StaticBackend::default());
        d.handle(&Interaction::Component(press.clone())).await.unwrap();
        d.handle(&Interaction::Component(ComponentPress { custom_id: "other".into(), ..press }))
            .await
            .unwrap();

        assert_eq!(
            platform.sent(),
            vec![Sent::Update {
                interaction_id: "i-1".into(),
                reply: Reply::public("✅ Submission 77 approved."),
            }]
        );
    }
}
