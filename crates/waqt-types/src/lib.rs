//! Core types shared across the waqt crates: the prayer data model, user
//! settings, the error taxonomy, and the collaborator ports.

pub mod clock;
pub mod error;
pub mod ports;
pub mod prayer;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, PortError, PortResult, PrayerError, Rejection};
pub use prayer::{ADJUSTMENT_LIMIT, CalculationMethod, DayPrayerTimes, Location, PrayerName, PrayerTime};
pub use settings::{GeoFix, LocationMode, LocationSettings, PrayerSettings, SnoozeSettings, TimeFormat};
