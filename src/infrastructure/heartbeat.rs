//! Uptime-monitor heartbeat

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::infrastructure::http::HttpClient;

/// Periodic GET against an uptime monitor's heartbeat URL
#[derive(Debug, Clone)]
pub struct Heartbeat {
    http: HttpClient,
    url: String,
    interval: Duration,
}

impl Heartbeat {
    pub fn new(http: HttpClient, url: impl Into<String>, interval: Duration) -> Self {
        Self {
            http,
            url: url.into(),
            interval,
        }
    }

    /// Ping once; failures are logged, never returned.
    pub async fn beat(&self) -> bool {
        match self.http.ping(&self.url).await {
            Ok(()) => {
                tracing::info!("heartbeat sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "heartbeat failed");
                false
            }
        }
    }

    /// Beat once per interval, forever. The first beat comes after one interval.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = tokio::time::interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.beat().await;
            }
        })
    }
}
