//! `/flag` - mark a stat submission for moderator review

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{
    colors, Button, ButtonStyle, Command, CommandContext, CommandHandler, CommandOption, Embed, Invocation, Reply,
};

pub const APPROVE_PREFIX: &str = "approve_";
pub const REJECT_PREFIX: &str = "reject_";

pub struct Flag;

pub fn command() -> Command {
    Command::new("flag", Flag)
        .with_description("Flag a stat submission for review")
        .with_option(CommandOption::string("id", "Submission ID").required())
}

/// Review card for a submission.
pub fn review_card(id: &str) -> Reply {
    let embed = Embed::new()
        .with_title("🔖 Submission Flagged")
        .with_description(format!("Submission ID: {id}"))
        .with_color(colors::ORANGE);

    Reply::embed(embed)
        .with_button(Button::new(format!("{APPROVE_PREFIX}{id}"), "Approve", ButtonStyle::Success))
        .with_button(Button::new(format!("{REJECT_PREFIX}{id}"), "Reject", ButtonStyle::Danger))
}

#[async_trait]
impl CommandHandler for Flag {
    async fn execute(&self, _ctx: &CommandContext, invocation: &Invocation) -> Result<Reply, CommandError> {
        let id = invocation.required_option("id")?;
        Ok(review_card(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{member, RecordingPlatform, StaticBackend};

    #[tokio::test]
    async fn attaches_exactly_two_buttons_for_the_id() {
        let ctx = CommandContext::new(Arc::new(RecordingPlatform::new()), Arc::new(StaticBackend::default()));
        let inv = Invocation::new("flag", member(), "review").with_option("id", "sub-991");

        let reply = Flag.execute(&ctx, &inv).await.unwrap();

        let ids: Vec<_> = reply.buttons.iter().map(|b| b.custom_id.as_str()).collect();
        assert_eq!(ids, ["approve_sub-991", "reject_sub-991"]);
        assert_eq!(reply.buttons[0].style, ButtonStyle::Success);
        assert_eq!(reply.buttons[1].style, ButtonStyle::Danger);
        assert!(!reply.is_ephemeral());

        let description = reply.embeds[0].description.as_deref().unwrap();
        assert!(description.contains("sub-991"));
    }
}
