//! Cron-driven channel announcements

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::cron::CronSchedule;
use crate::application::errors::{BotError, ScheduleError};
use crate::domain::entities::{Leaderboard, MvpOfDay};
use crate::domain::traits::{Backend, ChatPlatform};

/// Work performed on each firing of a job
#[async_trait]
pub trait JobAction: Send + Sync {
    async fn run(&self) -> Result<(), BotError>;
}

/// A named action bound to a cron schedule.
///
/// At most one firing per job is in flight; ticks that arrive while the
/// previous firing is still running are skipped.
pub struct ScheduledJob {
    pub name: String,
    pub schedule: CronSchedule,
    action: Arc<dyn JobAction>,
    in_flight: Arc<Mutex<()>>,
}

impl ScheduledJob {
    pub fn new(name: impl Into<String>, schedule: CronSchedule, action: Arc<dyn JobAction>) -> Self {
        Self {
            name: name.into(),
            schedule,
            action,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Start a firing in the background, or `None` if one is still running.
    pub fn try_fire(&self) -> Option<JoinHandle<()>> {
        let Ok(guard) = self.in_flight.clone().try_lock_owned() else {
            tracing::warn!(job = %self.name, "previous firing still in flight, skipping tick");
            return None;
        };

        let name = self.name.clone();
        let action = Arc::clone(&self.action);
        Some(tokio::spawn(async move {
            let _guard = guard;
            tracing::info!(job = %name, "firing scheduled job");
            match action.run().await {
                Ok(()) => tracing::info!(job = %name, "scheduled job completed"),
                Err(e) => tracing::error!(job = %name, error = %e, "scheduled job failed"),
            }
        }))
    }

    /// Next firing strictly after both `now` and the previous firing.
    ///
    /// `last` guards against the wall clock lagging the timer, which would
    /// otherwise schedule the same minute twice.
    pub fn next_firing(&self, now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        let from = last.map_or(now, |last| last.max(now));
        self.schedule.next_after(from)
    }

    /// Sleep until each firing and start it, reading wall-clock time from `clock`.
    /// Returns only when the schedule has no further firings.
    pub async fn run_schedule<C>(&self, clock: C)
    where
        C: Fn() -> DateTime<Utc> + Send,
    {
        let mut last = None;
        loop {
            let now = clock();
            let Some(next) = self.next_firing(now, last) else {
                tracing::warn!(job = %self.name, schedule = %self.schedule, "schedule never fires again");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(job = %self.name, wait_secs = wait.as_secs(), "waiting for next firing");
            tokio::time::sleep(wait).await;
            self.try_fire();
            last = Some(next);
        }
    }

    /// Run one firing inline, propagating its error.
    pub async fn run_once(&self) -> Result<(), BotError> {
        let _guard = self.in_flight.lock().await;
        self.action.run().await
    }
}

/// Owns the registered jobs for the lifetime of the process
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Arc<ScheduledJob>>,
}

impl Scheduler {
    pub fn new(jobs: Vec<ScheduledJob>) -> Self {
        Self {
            jobs: jobs.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn job(&self, name: &str) -> Option<&ScheduledJob> {
        self.jobs.iter().find(|j| j.name == name).map(|j| j.as_ref())
    }

    pub fn jobs(&self) -> impl Iterator<Item = &ScheduledJob> {
        self.jobs.iter().map(|j| j.as_ref())
    }

    /// Spawn one timer loop per job. Jobs are independent of each other.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.jobs
            .iter()
            .map(|job| {
                let job = Arc::clone(job);
                tokio::spawn(async move { job.run_schedule(Utc::now).await })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    Mvp,
    Leaderboard,
}

impl AnnouncementKind {
    pub fn job_name(self) -> &'static str {
        match self {
            AnnouncementKind::Mvp => "mvp",
            AnnouncementKind::Leaderboard => "leaderboard",
        }
    }
}

pub fn format_mvp(mvp: &MvpOfDay) -> String {
    format!("🏆 Today's MVP: **{}** with {} MVP points!", mvp.player, mvp.stats)
}

pub fn format_leaderboard(board: &Leaderboard) -> String {
    let lines: Vec<String> = board
        .top
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {} ({} pts)", i + 1, entry.name, entry.pts))
        .collect();
    format!("📈 Weekly Top 5:\n{}", lines.join("\n"))
}

/// Fetch, format and post to one fixed channel
pub struct Announcement {
    kind: AnnouncementKind,
    backend: Arc<dyn Backend>,
    platform: Arc<dyn ChatPlatform>,
    channel_id: String,
}

impl Announcement {
    pub fn new(
        kind: AnnouncementKind,
        backend: Arc<dyn Backend>,
        platform: Arc<dyn ChatPlatform>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            backend,
            platform,
            channel_id: channel_id.into(),
        }
    }
}

#[async_trait]
impl JobAction for Announcement {
    async fn run(&self) -> Result<(), BotError> {
        let message = match self.kind {
            AnnouncementKind::Mvp => format_mvp(&self.backend.mvp_today().await?),
            AnnouncementKind::Leaderboard => format_leaderboard(&self.backend.weekly_top5().await?),
        };
        self.platform.send_channel_message(&self.channel_id, &message).await?;
        Ok(())
    }
}

/// The MVP and leaderboard jobs, both posting to `channel_id`.
pub fn announcement_jobs(
    channel_id: &str,
    mvp_cron: &str,
    leaderboard_cron: &str,
    backend: Arc<dyn Backend>,
    platform: Arc<dyn ChatPlatform>,
) -> Result<Vec<ScheduledJob>, ScheduleError> {
    [
        (AnnouncementKind::Mvp, mvp_cron),
        (AnnouncementKind::Leaderboard, leaderboard_cron),
    ]
    .into_iter()
    .map(|(kind, cron)| {
        let action = Announcement::new(kind, backend.clone(), platform.clone(), channel_id);
        Ok(ScheduledJob::new(kind.job_name(), CronSchedule::parse(cron)?, Arc::new(action)))
    })
    .collect()
}
