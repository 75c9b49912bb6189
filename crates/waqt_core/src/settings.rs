//! Applying and persisting user preferences.

use tracing::warn;
use waqt_calendar::adjust_time;
use waqt_types::ports::SettingsStore;
use waqt_types::{ADJUSTMENT_LIMIT, DayPrayerTimes, PrayerError, PrayerName, PrayerSettings};

/// Storage key the settings document lives under.
pub const SETTINGS_KEY: &str = "prayer_settings";

/// Recomputes one prayer's displayed time from its original time.
pub fn apply_adjustment(day: &mut DayPrayerTimes, prayer: PrayerName, minutes: i32) {
    let p = day.prayer_mut(prayer);
    p.adjustment = minutes;
    p.time = if minutes == 0 {
        p.original_time.clone()
    } else {
        adjust_time(&p.original_time, minutes)
    };
}

/// Rewrites every prayer's adjustment and notification flag from `settings`.
pub fn apply_preferences(day: &mut DayPrayerTimes, settings: &PrayerSettings) {
    for prayer in PrayerName::ALL {
        apply_adjustment(day, prayer, settings.adjustment(prayer));
        day.prayer_mut(prayer).notification_enabled = settings.notification(prayer);
    }
}

/// Reads settings once at startup. Missing or unreadable documents yield
/// defaults; out-of-range adjustments are reset to zero.
pub async fn load_settings(store: &dyn SettingsStore) -> PrayerSettings {
    match store.get(SETTINGS_KEY).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(mut settings) => {
                reset_invalid_adjustments(&mut settings);
                settings
            }
            Err(e) => {
                warn!("Stored settings are unreadable, using defaults: {}", e);
                PrayerSettings::default()
            }
        },
        Ok(None) => PrayerSettings::default(),
        Err(e) => {
            warn!("Failed to load settings, using defaults: {}", e);
            PrayerSettings::default()
        }
    }
}

fn reset_invalid_adjustments(settings: &mut PrayerSettings) {
    for (prayer, minutes) in settings.time_adjustments.iter_mut() {
        if !(-ADJUSTMENT_LIMIT..=ADJUSTMENT_LIMIT).contains(minutes) {
            warn!("Stored {} adjustment of {} minutes is out of range, resetting", prayer, minutes);
            *minutes = 0;
        }
    }
}

pub async fn save_settings(store: &dyn SettingsStore, settings: &PrayerSettings) -> Result<(), PrayerError> {
    let value = serde_json::to_value(settings).map_err(|e| PrayerError::Persistence(e.to_string()))?;
    store
        .set(SETTINGS_KEY, value)
        .await
        .map_err(|e| PrayerError::Persistence(e.to_string()))
}
