use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{ComponentPress, Interaction, Reply, Visibility};

/// Chat platform abstraction - everything the bot sends goes through here
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a message to a channel, returning the new message id.
    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<String, BotError>;

    /// Send a direct message to a user, returning the new message id.
    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<String, BotError>;

    /// Answer an interaction with a reply.
    async fn reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError>;

    /// Acknowledge an interaction now and answer later with [`edit_reply`](Self::edit_reply).
    async fn defer(&self, interaction: &Interaction, visibility: Visibility) -> Result<(), BotError>;

    /// Replace the response of a previously deferred interaction.
    async fn edit_reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError>;

    /// Replace the message a pressed component belongs to.
    async fn update_message(&self, press: &ComponentPress, reply: &Reply) -> Result<(), BotError>;

    /// Short platform name for logs.
    fn name(&self) -> &str;
}
