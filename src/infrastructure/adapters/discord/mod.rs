//! Discord adapter: REST client, gateway and the glue to the dispatcher

pub mod gateway;
pub mod rest;
pub mod types;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::application::messaging::InteractionDispatcher;
use crate::domain::entities::{ComponentPress, CommandRegistry, Interaction, Reply, Visibility};
use crate::domain::traits::ChatPlatform;

pub use gateway::{GatewayConfig, GatewayEvent};
pub use rest::DiscordRest;
use types::{ApplicationCommandPayload, InteractionCallback, MessagePayload};

/// [`ChatPlatform`] backed by the Discord REST API
#[derive(Debug, Clone)]
pub struct DiscordAdapter {
    rest: DiscordRest,
    application_id: String,
}

impl DiscordAdapter {
    pub fn new(rest: DiscordRest, application_id: impl Into<String>) -> Self {
        Self {
            rest,
            application_id: application_id.into(),
        }
    }

    /// Publish every registered command, to one guild or globally.
    pub async fn register_commands(&self, registry: &CommandRegistry, guild_id: Option<&str>) -> Result<usize, BotError> {
        let payload: Vec<ApplicationCommandPayload> = registry.all().map(ApplicationCommandPayload::from).collect();
        let registered = self
            .rest
            .bulk_overwrite_commands(&self.application_id, guild_id, &payload)
            .await?;

        tracing::info!(
            count = registered.len(),
            scope = guild_id.unwrap_or("global"),
            "slash commands registered"
        );
        Ok(registered.len())
    }
}

#[async_trait]
impl ChatPlatform for DiscordAdapter {
    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<String, BotError> {
        let msg = self.rest.create_message(channel_id, &MessagePayload::text(content)).await?;
        Ok(msg.id)
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<String, BotError> {
        let channel = self.rest.create_dm(user_id).await?;
        self.send_channel_message(&channel.id, content).await
    }

    async fn reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        self.rest
            .create_interaction_response(interaction.id(), interaction.token(), &InteractionCallback::message(reply))
            .await
    }

    async fn defer(&self, interaction: &Interaction, visibility: Visibility) -> Result<(), BotError> {
        self.rest
            .create_interaction_response(
                interaction.id(),
                interaction.token(),
                &InteractionCallback::deferred(visibility),
            )
            .await
    }

    async fn edit_reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        let mut message = MessagePayload::from(reply);
        // visibility is fixed by the deferral
        message.flags = None;
        self.rest
            .edit_original_response(&self.application_id, interaction.token(), &message)
            .await
    }

    async fn update_message(&self, press: &ComponentPress, reply: &Reply) -> Result<(), BotError> {
        self.rest
            .create_interaction_response(&press.id, &press.token, &InteractionCallback::update(reply))
            .await
    }

    fn name(&self) -> &str {
        "discord"
    }
}

/// Connect to the gateway and hand every interaction to `dispatcher`,
/// one task per interaction. Returns when the gateway driver stops.
pub async fn serve_interactions(config: GatewayConfig, dispatcher: InteractionDispatcher) -> Result<(), BotError> {
    let mut handle = gateway::connect(config);

    while let Some(event) = handle.events.recv().await {
        match event {
            GatewayEvent::Ready { session_id, user } => {
                tracing::info!(%user, %session_id, "logged in to Discord");
            }
            GatewayEvent::InteractionCreate(payload) => {
                let Some(interaction) = payload.into_interaction() else {
                    continue;
                };
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.handle(&interaction).await {
                        tracing::error!(interaction = %interaction.id(), error = %e, "failed to answer interaction");
                    }
                });
            }
        }
    }

    match handle.driver.await {
        Ok(()) => Err(BotError::Gateway("gateway connection closed".to_string())),
        Err(e) => Err(BotError::Gateway(format!("gateway driver panicked: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::routing::{patch, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::application::commands::default_registry;
    use crate::domain::entities::{Invocation, User};
    use crate::testing::serve;

    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    async fn adapter(log: Log) -> DiscordAdapter {
        let router = Router::new()
            .route(
                "/interactions/{id}/{token}/callback",
                post(|State(log): State<Log>, Path((id, _)): Path<(String, String)>, Json(body): Json<Value>| async move {
                    log.lock().unwrap().push((format!("callback {id}"), body));
                    axum::http::StatusCode::NO_CONTENT
                }),
            )
            .route(
                "/webhooks/{app}/{token}/messages/@original",
                patch(|State(log): State<Log>, Path((app, _)): Path<(String, String)>, Json(body): Json<Value>| async move {
                    log.lock().unwrap().push((format!("edit {app}"), body));
                    Json(json!({"id": "orig"}))
                }),
            )
            .route(
                "/users/@me/channels",
                post(|Json(body): Json<Value>| async move { Json(json!({"id": format!("dm-{}", body["recipient_id"].as_str().unwrap_or_default())})) }),
            )
            .route(
                "/channels/{id}/messages",
                post(|State(log): State<Log>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    log.lock().unwrap().push((format!("message {id}"), body));
                    Json(json!({"id": "m1"}))
                }),
            )
            .route(
                "/applications/{app}/commands",
                put(|Json(body): Json<Value>| async move { Json(body) }),
            )
            .with_state(log);

        DiscordAdapter::new(DiscordRest::new("t").with_base_url(serve(router).await), "app")
    }

    fn interaction() -> Interaction {
        Interaction::Command(Invocation::new("roster", User::new("1", "u"), "c1"))
    }

    #[tokio::test]
    async fn deferred_reply_edits_original_without_flags() {
        let log = Log::default();
        let discord = adapter(log.clone()).await;

        discord.defer(&interaction(), Visibility::Ephemeral).await.unwrap();
        discord.edit_reply(&interaction(), &Reply::ephemeral("done")).await.unwrap();

        let entries = log.lock().unwrap().clone();
        assert_eq!(entries[0].1["type"], 5);
        assert_eq!(entries[0].1["data"]["flags"], 64);
        assert_eq!(entries[1].0, "edit app");
        assert_eq!(entries[1].1["content"], "done");
        assert!(entries[1].1.get("flags").is_none());
        assert_eq!(discord.name(), "discord");
    }

    #[tokio::test]
    async fn direct_message_goes_through_dm_channel() {
        let log = Log::default();
        let discord = adapter(log.clone()).await;

        discord.send_direct_message("42", "ping").await.unwrap();

        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec![("message dm-42".to_string(), json!({"content": "ping", "embeds": [], "components": []}))]);
    }

    #[tokio::test]
    async fn registers_every_command_globally() {
        let discord = adapter(Log::default()).await;
        let registry = default_registry().unwrap();

        let count = discord.register_commands(&registry, None).await.unwrap();
        assert_eq!(count, registry.len());
    }
}
