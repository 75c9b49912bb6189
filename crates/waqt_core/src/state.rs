//! The displayed-times state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Loading -> Displaying
//!            |
//!            +-> Error (blocking, nothing to show)
//!            +-> Error (transient, stale times stay visible) -> Displaying
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use waqt_types::{DayPrayerTimes, ErrorKind, PrayerError};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading {
        target: NaiveDate,
        /// What was on screen before the load started.
        previous: Option<DayPrayerTimes>,
    },
    Displaying(DayPrayerTimes),
    Error {
        message: String,
        kind: ErrorKind,
        /// Times still shown underneath a transient banner.
        stale: Option<DayPrayerTimes>,
        /// When the banner clears itself; only set with stale data.
        dismiss_at: Option<NaiveDateTime>,
    },
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    Load(NaiveDate),
    Resolved(DayPrayerTimes),
    Failed {
        error: PrayerError,
        /// Dismiss deadline to use if stale data exists.
        dismiss_at: NaiveDateTime,
    },
    Tick(NaiveDateTime),
    Dismiss,
}

impl ViewState {
    /// The single transition function.
    pub fn on(self, event: ViewEvent) -> ViewState {
        match (self, event) {
            (state, ViewEvent::Load(target)) => ViewState::Loading {
                target,
                previous: state.into_displayed(),
            },
            (_, ViewEvent::Resolved(times)) => ViewState::Displaying(times),
            (state, ViewEvent::Failed { error, dismiss_at }) => {
                let stale = state.into_displayed();
                let dismiss_at = stale.as_ref().map(|_| dismiss_at);
                ViewState::Error {
                    message: error.user_message(),
                    kind: error.kind(),
                    stale,
                    dismiss_at,
                }
            }
            (
                ViewState::Error { stale: Some(times), dismiss_at: Some(at), .. },
                ViewEvent::Tick(now),
            ) if at <= now => ViewState::Displaying(times),
            (ViewState::Error { stale: Some(times), .. }, ViewEvent::Dismiss) => {
                ViewState::Displaying(times)
            }
            (state, ViewEvent::Tick(_) | ViewEvent::Dismiss) => state,
        }
    }

    /// Times the UI should render in this state, if any.
    pub fn displayed(&self) -> Option<&DayPrayerTimes> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading { previous, .. } => previous.as_ref(),
            ViewState::Displaying(times) => Some(times),
            ViewState::Error { stale, .. } => stale.as_ref(),
        }
    }

    pub fn displayed_mut(&mut self) -> Option<&mut DayPrayerTimes> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading { previous, .. } => previous.as_mut(),
            ViewState::Displaying(times) => Some(times),
            ViewState::Error { stale, .. } => stale.as_mut(),
        }
    }

    fn into_displayed(self) -> Option<DayPrayerTimes> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading { previous, .. } => previous,
            ViewState::Displaying(times) => Some(times),
            ViewState::Error { stale, .. } => stale,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    /// True for an error with stale data underneath.
    pub fn has_stale_data(&self) -> bool {
        matches!(self, ViewState::Error { stale: Some(_), .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
