//! Clock-time helpers: parsing `HH:MM`, shifting by minutes with wraparound,
//! and 12/24-hour display.

use crate::error::CalendarError;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use waqt_types::TimeFormat;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, CalendarError> {
        if hour > 23 || minute > 59 {
            return Err(CalendarError::TimeOutOfRange { hour, minute });
        }
        Ok(Self { hour: hour as u8, minute: minute as u8 })
    }

    /// Builds a time from minutes since midnight, wrapping in both directions.
    pub fn from_minutes(total: i32) -> Self {
        let m = total.rem_euclid(MINUTES_PER_DAY);
        Self { hour: (m / 60) as u8, minute: (m % 60) as u8 }
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    pub fn minutes_since_midnight(&self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }

    pub fn shifted(&self, minutes: i32) -> Self {
        Self::from_minutes(self.minutes_since_midnight() + minutes.rem_euclid(MINUTES_PER_DAY))
    }

    /// `h:MM AM` / `h:MM PM`.
    pub fn to_12h(&self) -> String {
        let (h, period) = match self.hour {
            0 => (12, "AM"),
            1..=11 => (self.hour, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02} {}", h, self.minute, period)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = strip_annotation(s);
        let (h, m) = bare
            .split_once(':')
            .ok_or_else(|| CalendarError::MalformedTime(s.to_string()))?;
        let hour: u32 = h.trim().parse().map_err(|_| CalendarError::MalformedTime(s.to_string()))?;
        let minute: u32 = m.trim().parse().map_err(|_| CalendarError::MalformedTime(s.to_string()))?;
        ClockTime::new(hour, minute)
    }
}

/// Drops a trailing parenthetical timezone note, e.g. `"04:12 (+03)"` -> `"04:12"`.
pub fn strip_annotation(time: &str) -> &str {
    match time.find('(') {
        Some(idx) => time[..idx].trim(),
        None => time.trim(),
    }
}

/// Shifts `time` by `minutes`, wrapping around midnight.
///
/// Malformed input is returned unchanged. The caller is responsible for
/// bounding `minutes`.
pub fn adjust_time(time: &str, minutes: i32) -> String {
    match time.parse::<ClockTime>() {
        Ok(t) => t.shifted(minutes).to_string(),
        Err(e) => {
            warn!("Cannot adjust {:?}: {}", time, e);
            time.to_string()
        }
    }
}

/// Renders `time` in the preferred clock format.
///
/// 24-hour is the identity; malformed input is returned unchanged.
pub fn format_time(time: &str, format: TimeFormat) -> String {
    match format {
        TimeFormat::H24 => time.to_string(),
        TimeFormat::H12 => match time.parse::<ClockTime>() {
            Ok(t) => t.to_12h(),
            Err(e) => {
                warn!("Cannot format {:?}: {}", time, e);
                time.to_string()
            }
        },
    }
}

/// Minutes since midnight, or `None` when `time` does not parse.
pub fn minutes_of(time: &str) -> Option<i32> {
    time.parse::<ClockTime>().ok().map(|t| t.minutes_since_midnight())
}
