//! Console adapter for development/testing
//!
//! Lines typed on stdin are parsed as slash commands and answered on stdout.
//! `press <custom_id>` simulates a button click; `/help [command]` lists commands.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::errors::BotError;
use crate::application::messaging::{InteractionDispatcher, MessageParser};
use crate::domain::entities::{ComponentPress, Interaction, Permissions, Reply, User, Visibility};
use crate::domain::traits::ChatPlatform;

pub const CONSOLE_CHANNEL: &str = "console";

/// Console user; holds every permission.
pub fn console_user() -> User {
    User::new("0", "console")
}

/// Prints everything the bot sends, or records it when capturing.
#[derive(Default)]
pub struct ConsoleAdapter {
    captured: Option<Mutex<Vec<String>>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record output instead of printing it.
    pub fn capturing() -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .and_then(|c| c.lock().ok().map(|lines| lines.clone()))
            .unwrap_or_default()
    }

    pub fn emit(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.captured {
            Some(captured) => {
                if let Ok(mut lines) = captured.lock() {
                    lines.push(line);
                }
            }
            None => println!("{}", line),
        }
    }
}

/// Plain-text rendering of a reply.
pub fn render(reply: &Reply) -> String {
    let mut out = Vec::new();
    if reply.is_ephemeral() {
        out.push("(only you can see this)".to_string());
    }
    if let Some(content) = &reply.content {
        out.push(content.clone());
    }
    for embed in &reply.embeds {
        if let Some(title) = &embed.title {
            out.push(format!("== {} ==", title));
        }
        if let Some(description) = &embed.description {
            out.push(description.clone());
        }
        for field in &embed.fields {
            out.push(format!("{}: {}", field.name, field.value));
        }
    }
    if !reply.buttons.is_empty() {
        let buttons: Vec<String> = reply
            .buttons
            .iter()
            .map(|b| format!("[{}] (press {})", b.label, b.custom_id))
            .collect();
        out.push(buttons.join("  "));
    }
    out.join("\n")
}

#[async_trait]
impl ChatPlatform for ConsoleAdapter {
    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<String, BotError> {
        self.emit(format!("[#{}] {}", channel_id, content));
        Ok("console_msg".to_string())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<String, BotError> {
        self.emit(format!("[DM @{}] {}", user_id, content));
        Ok("console_dm".to_string())
    }

    async fn reply(&self, _interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        self.emit(format!("[BOT] {}", render(reply)));
        Ok(())
    }

    async fn defer(&self, _interaction: &Interaction, _visibility: Visibility) -> Result<(), BotError> {
        self.emit("[BOT] is thinking...");
        Ok(())
    }

    async fn edit_reply(&self, _interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        self.emit(format!("[BOT] {}", render(reply)));
        Ok(())
    }

    async fn update_message(&self, _press: &ComponentPress, reply: &Reply) -> Result<(), BotError> {
        self.emit(format!("[BOT edited] {}", render(reply)));
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Read lines from `input` until EOF, handling each to completion.
pub async fn run_console<R>(
    input: R,
    console: Arc<ConsoleAdapter>,
    dispatcher: InteractionDispatcher,
    parser: MessageParser,
) -> Result<(), BotError>
where
    R: AsyncBufRead + Unpin,
{
    tracing::info!("Starting console bot (dev mode)");
    let mut lines = input.lines();
    let mut presses = 0u64;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BotError::Internal(format!("reading stdin: {}", e)))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(custom_id) = line.strip_prefix("press ") {
            presses += 1;
            let press = ComponentPress {
                id: format!("press-{}", presses),
                token: String::new(),
                custom_id: custom_id.trim().to_string(),
                user: console_user(),
                channel_id: CONSOLE_CHANNEL.to_string(),
            };
            dispatcher.handle(&Interaction::Component(press)).await?;
            continue;
        }

        let Some(invocation) = parser.parse(line, console_user(), Permissions::all(), CONSOLE_CHANNEL) else {
            console.emit(format!("Echo: {}", line));
            continue;
        };

        if invocation.command == "help" {
            let topic = line.split_whitespace().nth(1).map(|t| t.trim_start_matches('/'));
            console.emit(dispatcher.commands().get_help(topic));
            continue;
        }
        if dispatcher.commands().command(&invocation.command).is_none() {
            console.emit(format!("Unknown command /{}. Try /help", invocation.command));
            continue;
        }

        if let Err(e) = dispatcher.handle(&Interaction::Command(invocation)).await {
            console.emit(format!("Error: {}", e));
        }
    }

    tracing::info!("console input closed");
    Ok(())
}
