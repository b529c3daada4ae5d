//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::application::scheduler::CronSchedule;

/// Daily MVP announcement, 09:00 UTC.
pub const DEFAULT_MVP_CRON: &str = "0 9 * * *";
/// Weekly top five, Mondays 12:00 UTC.
pub const DEFAULT_LEADERBOARD_CRON: &str = "0 12 * * 1";

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub discord: DiscordConfig,
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
    pub heartbeat: HeartbeatConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiscordConfig {
    pub token: Option<String>,
    pub application_id: Option<String>,
    pub guild_id: Option<String>,
    /// Register slash commands globally instead of for one guild.
    pub register_global: bool,
    pub announce_channel_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScheduleConfig {
    pub mvp: String,
    pub leaderboard: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HeartbeatConfig {
    pub url: Option<String>,
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RelayConfig {
    pub listen: String,
    pub webhook_url: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "bodega-bot".to_string(),
            prefix: "/".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mvp: DEFAULT_MVP_CRON.to_string(),
            leaderboard: DEFAULT_LEADERBOARD_CRON.to_string(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            url: None,
            interval_seconds: 60,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8787".to_string(),
            webhook_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            discord: DiscordConfig::default(),
            api: ApiConfig::default(),
            schedule: ScheduleConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overlay values from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(non_empty);

        if let Some(token) = get("DISCORD_TOKEN") {
            self.discord.token = Some(token);
        }
        if let Some(id) = get("CLIENT_ID") {
            self.discord.application_id = Some(id);
        }
        if let Some(id) = get("GUILD_ID") {
            self.discord.guild_id = Some(id);
        }
        if let Some(flag) = get("REGISTER_GLOBAL") {
            self.discord.register_global = flag.eq_ignore_ascii_case("true");
        }
        if let Some(id) = get("ANNOUNCE_CHANNEL_ID") {
            self.discord.announce_channel_id = Some(id);
        }
        if let Some(url) = get("API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = get("UPTIMEROBOT_HEARTBEAT_URL") {
            self.heartbeat.url = Some(url);
        }
        if let Some(url) = get("DISCORD_WEBHOOK_URL") {
            self.relay.webhook_url = Some(url);
        }
        if let Some(addr) = get("RELAY_LISTEN") {
            self.relay.listen = addr;
        }
        if let Some(prefix) = get("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        self
    }

    /// Check everything a gateway run needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.token.is_none() {
            return Err(ConfigError::MissingField("discord.token (DISCORD_TOKEN)".to_string()));
        }
        self.validate_registration()?;
        if self.discord.announce_channel_id.is_none() {
            return Err(ConfigError::MissingField(
                "discord.announce-channel-id (ANNOUNCE_CHANNEL_ID)".to_string(),
            ));
        }
        self.validate_api()?;
        for (name, expr) in [("schedule.mvp", &self.schedule.mvp), ("schedule.leaderboard", &self.schedule.leaderboard)] {
            CronSchedule::parse(expr).map_err(|e| ConfigError::InvalidValue(format!("{name}: {e}")))?;
        }
        if self.heartbeat.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue("heartbeat.interval-seconds must be > 0".to_string()));
        }
        Ok(())
    }

    /// Check what command registration needs.
    pub fn validate_registration(&self) -> Result<(), ConfigError> {
        if self.discord.application_id.is_none() {
            return Err(ConfigError::MissingField("discord.application-id (CLIENT_ID)".to_string()));
        }
        if !self.discord.register_global && self.discord.guild_id.is_none() {
            return Err(ConfigError::MissingField(
                "discord.guild-id (GUILD_ID) unless register-global is set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_api(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!("api.base-url must be http(s): {url}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn complete() -> Config {
        Config::default().with_overrides(env(&[
            ("DISCORD_TOKEN", "tok"),
            ("CLIENT_ID", "app"),
            ("GUILD_ID", "guild"),
            ("ANNOUNCE_CHANNEL_ID", "chan"),
            ("API_URL", "https://api.example.com"),
        ]))
    }

    #[test]
    fn defaults_carry_fixed_schedules() {
        let config = Config::default();
        assert_eq!(config.schedule.mvp, "0 9 * * *");
        assert_eq!(config.schedule.leaderboard, "0 12 * * 1");
        assert_eq!(config.heartbeat.interval_seconds, 60);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = Config::from_yaml(
            "discord:\n  token: abc\n  announce-channel-id: \"123\"\napi:\n  base-url: https://league.example\n",
        )
        .unwrap();
        assert_eq!(config.discord.token.as_deref(), Some("abc"));
        assert_eq!(config.discord.announce_channel_id.as_deref(), Some("123"));
        assert_eq!(config.api.base_url, "https://league.example");
        assert_eq!(config.bot.name, "bodega-bot");
        assert!(!config.discord.register_global);
    }

    #[test]
    fn env_overrides_file_values_and_ignores_blanks() {
        let config = Config::from_yaml("api:\n  base-url: https://file.example\n")
            .unwrap()
            .with_overrides(env(&[("API_URL", "https://env.example"), ("DISCORD_TOKEN", "  "), ("REGISTER_GLOBAL", "TRUE")]));
        assert_eq!(config.api.base_url, "https://env.example");
        assert_eq!(config.discord.token, None);
        assert!(config.discord.register_global);
    }

    #[test]
    fn validate_reports_missing_fields() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.discord.announce_channel_id = None;
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(f)) if f.contains("announce-channel-id")));

        let mut config = complete();
        config.discord.guild_id = None;
        assert!(config.validate().is_err());
        config.discord.register_global = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_schedules_and_urls() {
        let mut config = complete();
        config.schedule.mvp = "daily".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(v)) if v.starts_with("schedule.mvp")));

        let mut config = complete();
        config.api.base_url = "ftp://nope".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn yaml_round_trips_through_init_config_output() {
        let yaml = complete().to_yaml().unwrap();
        assert!(yaml.contains("announce-channel-id"));
        let back = Config::from_yaml(&yaml).unwrap();
        assert_eq!(back.discord.token.as_deref(), Some("tok"));
    }
}
