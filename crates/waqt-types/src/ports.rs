//! Contracts for the external collaborators the engine drives.
//!
//! The engine treats every implementation as a black box: results are used as
//! returned and errors are classified through [`PortError`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::PortResult;
use crate::prayer::{CalculationMethod, DayPrayerTimes, Location};
use crate::settings::{GeoFix, PrayerSettings};

/// Fetches a whole month of calculated prayer times.
#[async_trait]
pub trait MonthlyTimesFetcher: Send + Sync {
    async fn fetch_month(
        &self,
        location: &Location,
        method: &CalculationMethod,
        year: i32,
        month: u32,
    ) -> PortResult<Vec<DayPrayerTimes>>;
}

/// Callback invoked with the new connectivity state.
pub type ConnectivityListener = Arc<dyn Fn(bool) + Send + Sync>;

#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_connected(&self) -> bool;

    /// Registers for change notifications. Sources without push updates
    /// may ignore the listener.
    fn subscribe(&self, _listener: ConnectivityListener) {}
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> PortResult<GeoFix>;
}

#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule_all(&self, day: &DayPrayerTimes, settings: &PrayerSettings) -> PortResult<()>;
    async fn cancel_all(&self) -> PortResult<()>;
}

/// Key-value JSON persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> PortResult<()>;
}
