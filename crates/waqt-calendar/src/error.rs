use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from calendar and clock-time parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarError {
    /// Not of the form `HH:MM`.
    #[error("Malformed time {0:?}, expected HH:MM")]
    MalformedTime(String),

    #[error("Time {hour}:{minute} is out of range")]
    TimeOutOfRange { hour: u32, minute: u32 },

    /// Not of the form `YYYY-MM-DD` (or `YYYY-MM` for month keys).
    #[error("Malformed date {0:?}")]
    MalformedDate(String),

    /// Date outside the range supported by Hijri conversion.
    #[error("Date {date} is out of supported range ({min} to {max})")]
    DateOutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
}
