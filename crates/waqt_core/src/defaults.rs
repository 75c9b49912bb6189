//! In-process stand-ins for collaborators a host may not provide.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use waqt_types::ports::{Connectivity, LocationProvider, NotificationScheduler, SettingsStore};
use waqt_types::{DayPrayerTimes, GeoFix, PortError, PortResult, PrayerSettings};

/// Reports the device as always online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConnected;

#[async_trait]
impl Connectivity for AlwaysConnected {
    async fn is_connected(&self) -> bool {
        true
    }
}

/// Accepts and drops every scheduling request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScheduler;

#[async_trait]
impl NotificationScheduler for NoopScheduler {
    async fn schedule_all(&self, _day: &DayPrayerTimes, _settings: &PrayerSettings) -> PortResult<()> {
        Ok(())
    }

    async fn cancel_all(&self) -> PortResult<()> {
        Ok(())
    }
}

/// A host without location services.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

#[async_trait]
impl LocationProvider for NoLocationProvider {
    async fn current_location(&self) -> PortResult<GeoFix> {
        Err(PortError::PermissionDenied("location services are not available".to_string()))
    }
}

/// Volatile key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<Value>> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: Value) -> PortResult<()> {
        self.insert(key, value);
        Ok(())
    }
}
