use crate::config::BoothConfig;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use tracing::info;

pub const DEFAULT_HOUR: i64 = 10;
pub const DEFAULT_MINUTE: i64 = 0;

/// Daily cutover time. Always normalized: hour 24 wraps to 0, everything
/// else clamps into 0-23 / 0-59, so construction cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    hour: u32,
    minute: u32,
}

impl Threshold {
    pub fn new(hour: i64, minute: i64) -> Self {
        let norm_hour = if hour == 24 { 0 } else { hour.clamp(0, 23) };
        let norm_minute = minute.clamp(0, 59);
        if norm_hour != hour || norm_minute != minute {
            info!("normalized start time {hour}:{minute} to {norm_hour:02}:{norm_minute:02}");
        }
        Self {
            hour: norm_hour as u32,
            minute: norm_minute as u32,
        }
    }

    /// Read `DATE_FOLDER.start_hour` / `start_minute`, falling back to the
    /// defaults on missing or unparsable values.
    pub fn from_config(cfg: &BoothConfig) -> Self {
        let hour = cfg.get_int_or("DATE_FOLDER", "start_hour", DEFAULT_HOUR);
        let minute = cfg.get_int_or("DATE_FOLDER", "start_minute", DEFAULT_MINUTE);
        Self::new(hour, minute)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Before/after rule: strictly before today's cutover instant the
    /// effective date is yesterday; at or after it, today.
    pub fn effective_date(&self, now: NaiveDateTime) -> NaiveDate {
        let cutover =
            NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        if now.time() < cutover {
            now.date().pred_opt().unwrap_or_else(|| now.date())
        } else {
            now.date()
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.hour, self.minute)
    }
}
