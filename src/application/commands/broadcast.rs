//! `/broadcast` - administrator announcement in the invoking channel

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::application::services::permission_gate;
use crate::domain::entities::{Command, CommandContext, CommandHandler, CommandOption, Invocation, Permissions, Reply};

pub const PREFIX: &str = "📢";
pub const SENT: &str = "✅ Broadcast sent.";
pub const DENIED: &str = "⛔ You need the Administrator permission to broadcast.";

pub struct Broadcast;

pub fn command() -> Command {
    Command::new("broadcast", Broadcast)
        .with_description("Send an announcement to this channel")
        .with_option(CommandOption::string("message", "Announcement text").required())
        .with_permission(Permissions::ADMINISTRATOR)
}

#[async_trait]
impl CommandHandler for Broadcast {
    async fn execute(&self, ctx: &CommandContext, invocation: &Invocation) -> Result<Reply, CommandError> {
        if let Err(e) = permission_gate::require(invocation, Permissions::ADMINISTRATOR) {
            tracing::info!(error = %e, "broadcast rejected");
            return Ok(Reply::ephemeral(DENIED));
        }

        let message = invocation.required_option("message")?;
        ctx.platform
            .send_channel_message(&invocation.channel_id, &format!("{PREFIX} {message}"))
            .await?;

        tracing::info!(channel = %invocation.channel_id, user = %invocation.user.id, "broadcast sent");
        Ok(Reply::ephemeral(SENT))
    }
}
