//! Discord REST API v10 client

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::types::{ApplicationCommandPayload, ChannelRef, InteractionCallback, MessagePayload, MessageRef};
use crate::application::errors::BotError;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!("DiscordBot (bodega-bot, ", env!("CARGO_PKG_VERSION"), ")");

/// 429 retries before the request is reported as failed.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Authenticated REST client; cheap to clone.
#[derive(Debug, Clone)]
pub struct DiscordRest {
    client: Client,
    token: String,
    base_url: String,
}

impl DiscordRest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send one request; non-success statuses become [`BotError::Platform`].
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, BotError> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let mut req = self
                .client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bot {}", self.token))
                .header("User-Agent", USER_AGENT);
            if let Some(body) = body {
                req = req.json(body);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| BotError::Platform(format!("{method} {path}: {e}")))?;
            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RATE_LIMIT_RETRIES {
                let delay = retry_after(resp.headers()).min(MAX_RETRY_AFTER);
                warn!(%method, path, attempt, delay_ms = delay.as_millis() as u64, "rate-limited by Discord");
                tokio::time::sleep(delay).await;
                continue;
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| BotError::Platform(format!("{method} {path}: {e}")))?;

            if !status.is_success() {
                return Err(BotError::Platform(format!(
                    "{method} {path} returned {status}: {}",
                    String::from_utf8_lossy(&bytes)
                )));
            }
            debug!(%method, path, %status, "discord request ok");
            return Ok(bytes.to_vec());
        }

        Err(BotError::Platform(format!("{method} {path}: rate-limited after retries")))
    }

    async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, BotError> {
        let bytes = self.request(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| BotError::Platform(format!("decoding {path}: {e}")))
    }

    pub async fn create_message(&self, channel_id: &str, message: &MessagePayload) -> Result<MessageRef, BotError> {
        self.request_json(Method::POST, &format!("/channels/{channel_id}/messages"), Some(message))
            .await
    }

    /// Open (or fetch) the DM channel with a user.
    pub async fn create_dm(&self, user_id: &str) -> Result<ChannelRef, BotError> {
        let body = serde_json::json!({ "recipient_id": user_id });
        self.request_json(Method::POST, "/users/@me/channels", Some(&body)).await
    }

    pub async fn create_interaction_response(
        &self,
        interaction_id: &str,
        token: &str,
        callback: &InteractionCallback,
    ) -> Result<(), BotError> {
        self.request(
            Method::POST,
            &format!("/interactions/{interaction_id}/{token}/callback"),
            Some(callback),
        )
        .await
        .map(|_| ())
    }

    pub async fn edit_original_response(
        &self,
        application_id: &str,
        token: &str,
        message: &MessagePayload,
    ) -> Result<(), BotError> {
        self.request(
            Method::PATCH,
            &format!("/webhooks/{application_id}/{token}/messages/@original"),
            Some(message),
        )
        .await
        .map(|_| ())
    }

    /// Replace the full set of slash commands, globally or for one guild.
    pub async fn bulk_overwrite_commands(
        &self,
        application_id: &str,
        guild_id: Option<&str>,
        commands: &[ApplicationCommandPayload],
    ) -> Result<Vec<serde_json::Value>, BotError> {
        let path = match guild_id {
            Some(guild) => format!("/applications/{application_id}/guilds/{guild}/commands"),
            None => format!("/applications/{application_id}/commands"),
        };
        self.request_json(Method::PUT, &path, Some(commands)).await
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(Duration::from_secs(1))
}
