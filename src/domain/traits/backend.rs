use async_trait::async_trait;

use crate::application::errors::FetchError;
use crate::domain::entities::{Leaderboard, MissingCaptain, MvpOfDay, Roster};

/// League backend abstraction - read-only, never cached
#[async_trait]
pub trait Backend: Send + Sync {
    async fn missing_captains(&self) -> Result<Vec<MissingCaptain>, FetchError>;

    async fn mvp_today(&self) -> Result<MvpOfDay, FetchError>;

    async fn weekly_top5(&self) -> Result<Leaderboard, FetchError>;

    async fn team_roster(&self, team: &str) -> Result<Roster, FetchError>;
}
