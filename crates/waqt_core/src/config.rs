use chrono::Duration;
use serde::{Deserialize, Serialize};
use waqt_types::PrayerError;

/// Longest accepted purge delay, banner time or tick period: one week.
pub const MAX_TIMER_SECS: u64 = 7 * 24 * 60 * 60;
/// Longest accepted navigation window: a century.
pub const MAX_WINDOW_DAYS: i64 = 36_525;

/// Engine timing and range configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Delay after a non-current month is cached before non-current months are purged.
    pub month_purge_delay_secs: u64,
    /// How long a failure banner stays over stale data.
    pub error_display_secs: u64,
    /// Period of the next-prayer refresh.
    pub tick_interval_secs: u64,
    /// Production mode: how far from today navigation may go, either way.
    pub navigation_window_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            month_purge_delay_secs: 30,
            error_display_secs: 3,
            tick_interval_secs: 60,
            navigation_window_days: 365,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    pub fn month_purge_delay(&self) -> Duration {
        Duration::seconds(self.month_purge_delay_secs.min(MAX_TIMER_SECS) as i64)
    }

    pub fn error_display(&self) -> Duration {
        Duration::seconds(self.error_display_secs.min(MAX_TIMER_SECS) as i64)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs.min(MAX_TIMER_SECS))
    }

    pub fn navigation_window(&self) -> Duration {
        Duration::days(self.navigation_window_days.clamp(0, MAX_WINDOW_DAYS))
    }

    /// Checks the invariants the builder enforces, for deserialized configs.
    pub fn validate(&self) -> Result<(), PrayerError> {
        for (name, secs) in [
            ("month purge delay", self.month_purge_delay_secs),
            ("error display time", self.error_display_secs),
            ("tick interval", self.tick_interval_secs),
        ] {
            if secs == 0 || secs > MAX_TIMER_SECS {
                return Err(PrayerError::invalid_config(format!(
                    "{} of {}s must be between 1 and {}",
                    name, secs, MAX_TIMER_SECS
                )));
            }
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.navigation_window_days) {
            return Err(PrayerError::invalid_config(format!(
                "Navigation window of {} days must be between 1 and {}",
                self.navigation_window_days, MAX_WINDOW_DAYS
            )));
        }
        Ok(())
    }
}

/// Builder with validation for `ServiceConfig`.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    month_purge_delay_secs: Option<u64>,
    error_display_secs: Option<u64>,
    tick_interval_secs: Option<u64>,
    navigation_window_days: Option<i64>,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn month_purge_delay_secs(mut self, secs: u64) -> Self { self.month_purge_delay_secs = Some(secs); self }
    pub fn error_display_secs(mut self, secs: u64) -> Self { self.error_display_secs = Some(secs); self }
    pub fn tick_interval_secs(mut self, secs: u64) -> Self { self.tick_interval_secs = Some(secs); self }
    pub fn navigation_window_days(mut self, days: i64) -> Self { self.navigation_window_days = Some(days); self }

    /// Builds and validates.
    pub fn build(self) -> Result<ServiceConfig, PrayerError> {
        let defaults = ServiceConfig::default();
        let config = ServiceConfig {
            month_purge_delay_secs: self.month_purge_delay_secs.unwrap_or(defaults.month_purge_delay_secs),
            error_display_secs: self.error_display_secs.unwrap_or(defaults.error_display_secs),
            tick_interval_secs: self.tick_interval_secs.unwrap_or(defaults.tick_interval_secs),
            navigation_window_days: self.navigation_window_days.unwrap_or(defaults.navigation_window_days),
        };
        config.validate()?;
        Ok(config)
    }
}
