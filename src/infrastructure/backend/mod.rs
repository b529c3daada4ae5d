//! League backend REST client

use async_trait::async_trait;
use reqwest::Url;

use crate::application::errors::FetchError;
use crate::domain::entities::{Leaderboard, MissingCaptain, MvpOfDay, Roster};
use crate::domain::traits::Backend;
use crate::infrastructure::http::HttpClient;

/// Typed access to the league backend under one base URL
#[derive(Debug, Clone)]
pub struct BackendApi {
    http: HttpClient,
    base_url: String,
}

impl BackendApi {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/teams/{team}/roster` with the team name percent-encoded.
    fn roster_url(&self, team: &str) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| FetchError::Network(format!("bad API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("API URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["teams", team, "roster"]);
        Ok(url.into())
    }
}

#[async_trait]
impl Backend for BackendApi {
    async fn missing_captains(&self) -> Result<Vec<MissingCaptain>, FetchError> {
        self.http.get_json(&self.url("/api/captains/missing")).await
    }

    async fn mvp_today(&self) -> Result<MvpOfDay, FetchError> {
        self.http.get_json(&self.url("/api/mvp/today")).await
    }

    async fn weekly_top5(&self) -> Result<Leaderboard, FetchError> {
        self.http.get_json(&self.url("/api/leaderboard/top5?period=week")).await
    }

    async fn team_roster(&self, team: &str) -> Result<Roster, FetchError> {
        self.http.get_json(&self.roster_url(team)?).await
    }
}
