//! Scheduled jobs - cron parsing and timed announcements

pub mod announcer;
pub mod cron;

pub use announcer::{
    announcement_jobs, format_leaderboard, format_mvp, Announcement, AnnouncementKind, JobAction, ScheduledJob,
    Scheduler,
};
pub use cron::CronSchedule;
