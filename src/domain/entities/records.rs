//! Records served by the league backend.

use serde::Deserialize;

/// Captain who has not submitted this week's stats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingCaptain {
    pub discord_id: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MvpOfDay {
    pub player: String,
    pub stats: serde_json::Number,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub pts: serde_json::Number,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Leaderboard {
    pub top: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterPlayer {
    pub gamertag: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roster {
    pub players: Vec<RosterPlayer>,
}
