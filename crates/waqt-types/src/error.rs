use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a navigation target was refused before any fetch was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Sample mode: the target year is not the demonstration year.
    OutOfDemoYear,
    /// Sample mode: the day just before the demonstration month.
    BeginningOfSampleData,
    /// Sample mode: the month just after the demonstration month.
    NoNextMonthData,
    /// Sample mode: any other month.
    MonthNotAvailable,
    /// Production mode: more than the navigation window away from today.
    DateRangeExceeded,
    /// Production mode: the device is offline.
    NoInternetConnection,
    /// The raw target could not be read as a date.
    InvalidDate(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfDemoYear => write!(f, "out of demo year range"),
            Rejection::BeginningOfSampleData => write!(f, "beginning of sample data"),
            Rejection::NoNextMonthData => write!(f, "no next month data"),
            Rejection::MonthNotAvailable => write!(f, "month not available"),
            Rejection::DateRangeExceeded => write!(f, "date range exceeded"),
            Rejection::NoInternetConnection => write!(f, "no internet connection"),
            Rejection::InvalidDate(raw) => write!(f, "invalid date: {}", raw),
        }
    }
}

/// Coarse classification used to decide how a failure is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Rejected before any I/O; the user is redirected.
    Validation,
    /// Nothing to show for that date; navigate elsewhere.
    DataUnavailable,
    /// Connectivity or fetch failure; retry is offered.
    Network,
    /// Settings could not be saved; in-memory state stays authoritative.
    Persistence,
    Other,
}

/// Errors from waqt operations.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrayerError {
    #[error("Navigation rejected: {0}")]
    Rejected(Rejection),

    #[error("Adjustment of {minutes} minutes is outside [-30, 30]")]
    InvalidAdjustment { minutes: i32 },

    #[error("Prayer times unavailable: {0}")]
    DataUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to persist settings: {0}")]
    Persistence(String),

    #[error("Location unavailable: {0}")]
    Location(String),

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A newer request was issued before this one completed.
    #[error("Request for {date} was superseded")]
    Superseded { date: NaiveDate },
}

impl PrayerError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PrayerError::Rejected(r) => match r {
                Rejection::OutOfDemoYear
                | Rejection::BeginningOfSampleData
                | Rejection::NoNextMonthData
                | Rejection::MonthNotAvailable => ErrorKind::DataUnavailable,
                Rejection::DateRangeExceeded | Rejection::InvalidDate(_) => ErrorKind::Validation,
                Rejection::NoInternetConnection => ErrorKind::Network,
            },
            PrayerError::InvalidAdjustment { .. } => ErrorKind::Validation,
            PrayerError::DataUnavailable(_) => ErrorKind::DataUnavailable,
            PrayerError::Network(_) => ErrorKind::Network,
            PrayerError::Persistence(_) => ErrorKind::Persistence,
            PrayerError::Location(_)
            | PrayerError::InvalidConfiguration { .. }
            | PrayerError::Superseded { .. } => ErrorKind::Other,
        }
    }

    /// Only connectivity failures can succeed on a plain retry.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Short message suitable for a banner.
    pub fn user_message(&self) -> String {
        match self {
            PrayerError::Rejected(r) => r.to_string(),
            PrayerError::DataUnavailable(msg)
            | PrayerError::Network(msg)
            | PrayerError::Location(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Rejection> for PrayerError {
    fn from(r: Rejection) -> Self {
        PrayerError::Rejected(r)
    }
}

/// Error returned by external collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

pub type PortResult<T> = Result<T, PortError>;

impl From<PortError> for PrayerError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Network(msg) => PrayerError::Network(msg),
            PortError::NotFound(msg) => PrayerError::DataUnavailable(msg),
            PortError::PermissionDenied(msg) => PrayerError::Location(msg),
            PortError::Unexpected(msg) => PrayerError::DataUnavailable(msg),
        }
    }
}
