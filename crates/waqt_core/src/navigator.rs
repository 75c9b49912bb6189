//! Pre-fetch validation of navigation targets.

use chrono::{Datelike, Duration, NaiveDate};
use waqt_calendar::{MonthKey, parse_date_lenient};
use waqt_types::ports::Connectivity;
use waqt_types::{ErrorKind, PrayerError, Rejection};

use crate::source::DataMode;

/// Checks whether a date may be navigated to in the current mode.
pub struct Navigator<'a> {
    mode: DataMode,
    connectivity: &'a dyn Connectivity,
    window: Duration,
}

impl<'a> Navigator<'a> {
    pub fn new(mode: DataMode, connectivity: &'a dyn Connectivity, window: Duration) -> Self {
        Self { mode, connectivity, window }
    }

    /// Validates `target` relative to the real `today`. No fetch happens here.
    pub async fn validate(&self, target: NaiveDate, today: NaiveDate) -> Result<(), Rejection> {
        match self.mode {
            DataMode::Sample(calendar) => check_sample(calendar.month(), target),
            DataMode::Production => {
                check_window(target, today, self.window)?;
                if !self.connectivity.is_connected().await {
                    return Err(Rejection::NoInternetConnection);
                }
                Ok(())
            }
        }
    }
}

/// Sample mode rules, checked in order: year, then month neighbourhood.
///
/// Stepping back off the first demo day is the beginning of the data; other
/// days of the previous month are simply unavailable. Anything in the
/// following month has no data yet.
pub fn check_sample(demo: MonthKey, target: NaiveDate) -> Result<(), Rejection> {
    if target.year() != demo.year {
        return Err(Rejection::OutOfDemoYear);
    }
    let month = MonthKey::of(target);
    if month == demo {
        Ok(())
    } else if target.succ_opt() == Some(demo.first_day()) {
        Err(Rejection::BeginningOfSampleData)
    } else if month == demo.succ() {
        Err(Rejection::NoNextMonthData)
    } else {
        Err(Rejection::MonthNotAvailable)
    }
}

/// Production mode: at most `window` before or after today.
pub fn check_window(target: NaiveDate, today: NaiveDate, window: Duration) -> Result<(), Rejection> {
    if (target - today).abs() > window {
        return Err(Rejection::DateRangeExceeded);
    }
    Ok(())
}

/// Reads a raw navigation target, rolling day overflow into the next month.
pub fn parse_target(raw: &str) -> Result<NaiveDate, Rejection> {
    parse_date_lenient(raw).map_err(|_| Rejection::InvalidDate(raw.to_string()))
}

/// What the user is offered after a failed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    /// Re-check connectivity, then navigate to the date again.
    Navigate(NaiveDate),
}

/// A user-facing failure notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
    pub retry: Option<RetryAction>,
}

impl Notice {
    /// Classifies a failed navigation to `target`.
    pub fn from_error(error: &PrayerError, target: NaiveDate) -> Self {
        let kind = error.kind();
        let message = match kind {
            ErrorKind::Network => format!("Unable to load prayer times: {}", error.user_message()),
            ErrorKind::DataUnavailable => format!("No prayer times for {}: {}", target, error.user_message()),
            _ => error.user_message(),
        };
        Self {
            kind,
            message,
            retry: error.is_retryable().then_some(RetryAction::Navigate(target)),
        }
    }
}
