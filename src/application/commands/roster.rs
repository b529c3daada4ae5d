//! `/roster` - show a team's players

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{
    colors, Command, CommandContext, CommandHandler, CommandOption, Embed, Invocation, Reply, Roster, Visibility,
};

pub const NOT_FOUND: &str = "⚠️ Team not found.";

pub struct RosterCommand;

pub fn command() -> Command {
    Command::new("roster", RosterCommand)
        .with_description("Show team roster")
        .with_option(CommandOption::string("team_name", "The name of the team").required())
        .deferred(Visibility::Public)
}

pub fn roster_embed(team: &str, roster: &Roster) -> Embed {
    roster.players.iter().fold(
        Embed::new().with_title(format!("{team} Roster")).with_color(colors::BLUE),
        |embed, p| embed.with_field(&p.gamertag, &p.role, false),
    )
}

#[async_trait]
impl CommandHandler for RosterCommand {
    async fn execute(&self, ctx: &CommandContext, invocation: &Invocation) -> Result<Reply, CommandError> {
        let team = invocation.required_option("team_name")?;

        match ctx.backend.team_roster(team).await {
            Ok(roster) => Ok(Reply::embed(roster_embed(team, &roster))),
            Err(e) => {
                tracing::info!(team, error = %e, "roster lookup failed");
                Ok(Reply::public(NOT_FOUND))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::entities::RosterPlayer;
    use crate::testing::{member, RecordingPlatform, StaticBackend};

    #[tokio::test]
    async fn lists_one_field_per_player() {
        let backend = StaticBackend {
            roster: Some(Roster {
                players: vec![
                    RosterPlayer { gamertag: "Zed".into(), role: "PG".into() },
                    RosterPlayer { gamertag: "Ivy".into(), role: "C".into() },
                ],
            }),
            ..Default::default()
        };
        let ctx = CommandContext::new(Arc::new(RecordingPlatform::new()), Arc::new(backend));
        let inv = Invocation::new("roster", member(), "chan").with_option("team_name", "Sharks");

        let reply = RosterCommand.execute(&ctx, &inv).await.unwrap();

        let embed = &reply.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Sharks Roster"));
        let fields: Vec<_> = embed.fields.iter().map(|f| (f.name.as_str(), f.value.as_str())).collect();
        assert_eq!(fields, [("Zed", "PG"), ("Ivy", "C")]);
    }

    #[tokio::test]
    async fn fetch_failure_reads_as_not_found() {
        let ctx = CommandContext::new(Arc::new(RecordingPlatform::new()), Arc::new(StaticBackend::default()));
        let inv = Invocation::new("roster", member(), "chan").with_option("team_name", "Ghosts");

        let reply = RosterCommand.execute(&ctx, &inv).await.unwrap();
        assert_eq!(reply, Reply::public(NOT_FOUND));
    }
}
