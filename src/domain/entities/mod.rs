//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod invocation;
pub mod permissions;
pub mod records;
pub mod reply;
pub mod user;

pub use command::{Command, CommandContext, CommandHandler, CommandOption, CommandRegistry};
pub use invocation::{ComponentPress, Interaction, Invocation};
pub use permissions::Permissions;
pub use records::{Leaderboard, LeaderboardEntry, MissingCaptain, MvpOfDay, Roster, RosterPlayer};
pub use reply::{colors, Button, ButtonStyle, Embed, EmbedField, Reply, Visibility};
pub use user::User;
