//! In-memory fakes of the platform and backend traits.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::errors::{BotError, FetchError};
use crate::domain::entities::{
    ComponentPress, Interaction, Leaderboard, MissingCaptain, MvpOfDay, Reply, Roster, User, Visibility,
};
use crate::domain::traits::{Backend, ChatPlatform};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Channel { channel_id: String, content: String },
    Direct { user_id: String, content: String },
    Reply { interaction_id: String, reply: Reply },
    Defer { interaction_id: String, visibility: Visibility },
    Edit { interaction_id: String, reply: Reply },
    Update { interaction_id: String, reply: Reply },
}

#[derive(Default)]
pub struct RecordingPlatform {
    sent: Mutex<Vec<Sent>>,
    failing_users: HashSet<String>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct messages to these users fail.
    pub fn failing_dms(users: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_users: users.iter().map(|u| u.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn channel_messages(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Channel { channel_id, content } => Some((channel_id, content)),
                _ => None,
            })
            .collect()
    }

    pub fn direct_messages(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Direct { user_id, content } => Some((user_id, content)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<String, BotError> {
        self.push(Sent::Channel {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        });
        Ok("msg".to_string())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<String, BotError> {
        self.push(Sent::Direct {
            user_id: user_id.to_string(),
            content: content.to_string(),
        });
        if self.failing_users.contains(user_id) {
            return Err(BotError::Platform(format!("cannot DM {user_id}")));
        }
        Ok("dm".to_string())
    }

    async fn reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        self.push(Sent::Reply {
            interaction_id: interaction.id().to_string(),
            reply: reply.clone(),
        });
        Ok(())
    }

    async fn defer(&self, interaction: &Interaction, visibility: Visibility) -> Result<(), BotError> {
        self.push(Sent::Defer {
            interaction_id: interaction.id().to_string(),
            visibility,
        });
        Ok(())
    }

    async fn edit_reply(&self, interaction: &Interaction, reply: &Reply) -> Result<(), BotError> {
        self.push(Sent::Edit {
            interaction_id: interaction.id().to_string(),
            reply: reply.clone(),
        });
        Ok(())
    }

    async fn update_message(&self, press: &ComponentPress, reply: &Reply) -> Result<(), BotError> {
        self.push(Sent::Update {
            interaction_id: press.id.clone(),
            reply: reply.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Backend serving fixed records; `None` fields fail with a network error.
#[derive(Default)]
pub struct StaticBackend {
    pub captains: Option<Vec<MissingCaptain>>,
    pub mvp: Option<MvpOfDay>,
    pub leaderboard: Option<Leaderboard>,
    pub roster: Option<Roster>,
}

fn unavailable<T>() -> Result<T, FetchError> {
    Err(FetchError::Network("backend unavailable".to_string()))
}

#[async_trait]
impl Backend for StaticBackend {
    async fn missing_captains(&self) -> Result<Vec<MissingCaptain>, FetchError> {
        self.captains.clone().map_or_else(unavailable, Ok)
    }

    async fn mvp_today(&self) -> Result<MvpOfDay, FetchError> {
        self.mvp.clone().map_or_else(unavailable, Ok)
    }

    async fn weekly_top5(&self) -> Result<Leaderboard, FetchError> {
        self.leaderboard.clone().map_or_else(unavailable, Ok)
    }

    async fn team_roster(&self, _team: &str) -> Result<Roster, FetchError> {
        self.roster.clone().map_or_else(unavailable, Ok)
    }
}

pub fn member() -> User {
    User::new("100", "member")
}

/// Serve `router` on an ephemeral local port, returning its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
