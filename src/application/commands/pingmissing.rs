//! `/pingmissing` - DM captains who have not submitted weekly stats

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandHandler, Invocation, MissingCaptain, Reply, Visibility};

pub struct PingMissing;

pub fn command() -> Command {
    Command::new("pingmissing", PingMissing)
        .with_description("DM captains who have not submitted weekly stats")
        .deferred(Visibility::Ephemeral)
}

pub fn reminder(captain: &MissingCaptain) -> String {
    format!("⚠️ You have not submitted stats for team **{}** this week!", captain.team)
}

#[async_trait]
impl CommandHandler for PingMissing {
    async fn execute(&self, ctx: &CommandContext, _invocation: &Invocation) -> Result<Reply, CommandError> {
        let captains = ctx.backend.missing_captains().await?;

        let sends = captains.iter().map(|captain| async move {
            let result = ctx
                .platform
                .send_direct_message(&captain.discord_id, &reminder(captain))
                .await;
            if let Err(e) = &result {
                tracing::warn!(captain = %captain.discord_id, team = %captain.team, error = %e, "reminder failed");
            }
            result
        });
        let results = join_all(sends).await;

        let delivered = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(attempted = captains.len(), delivered, "captain reminders sent");

        // Count reflects attempts, not deliveries.
        Ok(Reply::ephemeral(format!(
            "📨 Reminders sent to {} captains.",
            captains.len()
        )))
    }
}
