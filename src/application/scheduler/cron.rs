//! Five-field cron expressions evaluated in UTC.
//!
//! Supported syntax per field: `*`, `N`, `A-B`, lists `A,B,C` and steps
//! `*/S`, `A-B/S`, `A/S`. Fields are minute, hour, day-of-month, month and
//! day-of-week (0-7, both 0 and 7 are Sunday). When both day fields are
//! restricted a time matches if either matches, as in classic cron. A day
//! field starting with `*` (including `*/S`) counts as unrestricted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

use crate::application::errors::ScheduleError;

/// Upper bound on search steps; impossible schedules (e.g. Feb 30) give up.
const MAX_SEARCH_STEPS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    bits: u64,
    wildcard: bool,
}

impl Field {
    fn parse(expr: &str, name: &'static str, min: u32, max: u32) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidValue {
            field: name,
            value: expr.to_string(),
        };
        let number = |s: &str| -> Result<u32, ScheduleError> {
            let n: u32 = s.parse().map_err(|_| invalid())?;
            if n < min || n > max {
                return Err(ScheduleError::OutOfRange {
                    field: name,
                    value: n,
                    min,
                    max,
                });
            }
            Ok(n)
        };

        let mut bits = 0u64;
        for part in expr.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step: u32 = step.parse().map_err(|_| invalid())?;
                    if step == 0 {
                        return Err(invalid());
                    }
                    (range, Some(step))
                }
                None => (part, None),
            };

            let (lo, hi) = if range == "*" {
                (min, max)
            } else if let Some((a, b)) = range.split_once('-') {
                (number(a)?, number(b)?)
            } else {
                let n = number(range)?;
                // `N/S` means "from N to the end in steps of S".
                (n, if step.is_some() { max } else { n })
            };
            if lo > hi {
                return Err(invalid());
            }

            let step = step.unwrap_or(1) as usize;
            for v in (lo..=hi).step_by(step) {
                bits |= 1 << v;
            }
        }

        Ok(Self {
            bits,
            wildcard: expr.starts_with('*'),
        })
    }

    fn matches(&self, value: u32) -> bool {
        self.bits & (1 << value) != 0
    }
}

/// Parsed cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = fields.as_slice() else {
            return Err(ScheduleError::FieldCount(fields.len()));
        };

        let mut day_of_week = Field::parse(dow, "day-of-week", 0, 7)?;
        if day_of_week.matches(7) {
            day_of_week.bits |= 1;
        }

        Ok(Self {
            source: fields.join(" "),
            minute: Field::parse(minute, "minute", 0, 59)?,
            hour: Field::parse(hour, "hour", 0, 23)?,
            day_of_month: Field::parse(dom, "day-of-month", 1, 31)?,
            month: Field::parse(month, "month", 1, 12)?,
            day_of_week,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn day_matches(&self, t: &DateTime<Utc>) -> bool {
        let dom = self.day_of_month.matches(t.day());
        let dow = self.day_of_week.matches(t.weekday().num_days_from_sunday());
        if self.day_of_month.wildcard || self.day_of_week.wildcard {
            dom && dow
        } else {
            dom || dow
        }
    }

    /// First matching minute strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut t = after.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);

        for _ in 0..MAX_SEARCH_STEPS {
            if !self.month.matches(t.month()) {
                let (year, month) = if t.month() == 12 {
                    (t.year() + 1, 1)
                } else {
                    (t.year(), t.month() + 1)
                };
                t = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
                continue;
            }
            if !self.day_matches(&t) {
                t = t.date_naive().succ_opt()?.and_hms_opt(0, 0, 0)?.and_utc();
                continue;
            }
            if !self.hour.matches(t.hour()) {
                t = t.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !self.minute.matches(t.minute()) {
                t += Duration::minutes(1);
                continue;
            }
            return Some(t);
        }
        None
    }
}

impl FromStr for CronSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
