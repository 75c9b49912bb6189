//! Prayer-time scheduling and caching engine.
//!
//! [`PrayerTimesService`] answers "what are the prayer times for this date"
//! on top of a month cache, a per-day cache, manual per-prayer adjustments and
//! either an offline demonstration month or a live monthly fetcher.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod navigator;
pub mod service;
pub mod settings;
pub mod source;
pub mod state;
pub mod ticker;
pub mod upcoming;

pub use waqt_calendar::{ClockTime, MonthKey, adjust_time, format_time, month_key, parse_date_lenient};
pub use waqt_sample::SampleCalendar;
pub use waqt_types::ports;
pub use waqt_types::{
    ADJUSTMENT_LIMIT, CalculationMethod, Clock, DayPrayerTimes, ErrorKind, GeoFix, Location,
    LocationMode, LocationSettings, ManualClock, PortError, PortResult, PrayerError, PrayerName,
    PrayerSettings, PrayerTime, Rejection, SnoozeSettings, SystemClock, TimeFormat,
};

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use defaults::{AlwaysConnected, MemoryStore, NoLocationProvider, NoopScheduler};
pub use navigator::{Navigator, Notice, RetryAction};
pub use service::{PrayerTimesService, PrayerTimesSnapshot, ServiceBuilder, TelemetryHook};
pub use source::{DataMode, DataSource, ProductionSource, SampleSource};
pub use state::{ViewEvent, ViewState};
pub use ticker::TickerHandle;
pub use upcoming::NextPrayer;

#[cfg(feature = "network")]
pub use waqt_network as network;

pub mod prelude {
    pub use crate::ports::{Connectivity, LocationProvider, MonthlyTimesFetcher, NotificationScheduler, SettingsStore};
    pub use crate::{
        DataSource, DayPrayerTimes, Location, NextPrayer, PrayerError, PrayerName, PrayerSettings,
        PrayerTimesService, ProductionSource, SampleCalendar, SampleSource, ServiceConfig, ViewState,
    };
}
