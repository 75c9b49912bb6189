use crate::prayer::{CalculationMethod, Location, PrayerName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clock display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

/// Whether the location follows the device or a user-picked city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    Auto,
    #[default]
    Manual,
}

/// A resolved device position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

impl GeoFix {
    pub fn location(&self) -> Location {
        Location::new(self.city.clone(), self.country.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub mode: LocationMode,
    pub selected_city: Option<Location>,
    pub last_fix: Option<GeoFix>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            mode: LocationMode::Manual,
            selected_city: Some(Location::mecca()),
            last_fix: None,
        }
    }
}

impl LocationSettings {
    /// The location prayer times should be fetched for.
    ///
    /// Falls back to the other source when the preferred one is empty, and to
    /// Mecca when neither is set.
    pub fn effective(&self) -> Location {
        let fix = self.last_fix.as_ref().map(GeoFix::location);
        let manual = self.selected_city.clone();
        let preferred = match self.mode {
            LocationMode::Auto => fix.or(manual),
            LocationMode::Manual => manual.or(fix),
        };
        preferred.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnoozeSettings {
    pub enabled: bool,
    pub minutes: u32,
    pub max_count: u32,
}

impl Default for SnoozeSettings {
    fn default() -> Self {
        Self { enabled: false, minutes: 5, max_count: 3 }
    }
}

/// User preferences owned by the orchestrator and persisted on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerSettings {
    pub calculation_method: CalculationMethod,
    pub selected_audio: String,
    pub enable_adhan: bool,
    pub enable_vibration: bool,
    pub snooze: SnoozeSettings,
    pub fade_in_secs: u32,
    pub fade_out_secs: u32,
    pub volume: f32,
    pub time_format: TimeFormat,
    pub location: LocationSettings,
    pub time_adjustments: BTreeMap<PrayerName, i32>,
    pub notifications: BTreeMap<PrayerName, bool>,
}

impl Default for PrayerSettings {
    fn default() -> Self {
        Self {
            calculation_method: CalculationMethod::default(),
            selected_audio: "makkah".to_string(),
            enable_adhan: true,
            enable_vibration: true,
            snooze: SnoozeSettings::default(),
            fade_in_secs: 0,
            fade_out_secs: 0,
            volume: 1.0,
            time_format: TimeFormat::default(),
            location: LocationSettings::default(),
            time_adjustments: PrayerName::ALL.into_iter().map(|p| (p, 0)).collect(),
            notifications: PrayerName::ALL.into_iter().map(|p| (p, true)).collect(),
        }
    }
}

impl PrayerSettings {
    /// Manual shift for `prayer`, zero when unset.
    pub fn adjustment(&self, prayer: PrayerName) -> i32 {
        self.time_adjustments.get(&prayer).copied().unwrap_or(0)
    }

    /// Notification flag for `prayer`, enabled when unset.
    pub fn notification(&self, prayer: PrayerName) -> bool {
        self.notifications.get(&prayer).copied().unwrap_or(true)
    }
}
