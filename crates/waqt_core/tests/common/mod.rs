#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use waqt_core::ports::{
    Connectivity, ConnectivityListener, LocationProvider, MonthlyTimesFetcher,
    NotificationScheduler, SettingsStore,
};
use waqt_core::{
    CalculationMethod, DayPrayerTimes, GeoFix, Location, ManualClock, MemoryStore, PortError,
    PortResult, PrayerSettings, PrayerTimesService, ProductionSource, SampleCalendar,
    ServiceConfig, SampleSource,
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    date.and_hms_opt(h, min, 0).unwrap()
}

/// The real "today" every harness starts from.
pub fn today() -> NaiveDate {
    d(2026, 10, 19)
}

/// Serves generated months and records what was asked for.
#[derive(Default)]
pub struct MockFetcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<(Location, u8, i32, u32)>>,
    fail: AtomicBool,
    gated: AtomicBool,
    gates: Mutex<HashMap<u32, Arc<Notify>>>,
}

impl MockFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(Location, u8, i32, u32)> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Holds every fetch until its month is released.
    pub fn hold(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release(&self, month: u32) {
        self.gate(month).notify_one();
    }

    fn gate(&self, month: u32) -> Arc<Notify> {
        self.gates.lock().unwrap().entry(month).or_default().clone()
    }
}

#[async_trait]
impl MonthlyTimesFetcher for MockFetcher {
    async fn fetch_month(
        &self,
        location: &Location,
        method: &CalculationMethod,
        year: i32,
        month: u32,
    ) -> PortResult<Vec<DayPrayerTimes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((location.clone(), method.id, year, month));
        if self.gated.load(Ordering::SeqCst) {
            self.gate(month).notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Network("timeout".into()));
        }
        let calendar = SampleCalendar::new(year, month).map_err(|e| PortError::NotFound(e.to_string()))?;
        Ok(calendar.month_times(location, method))
    }
}

#[derive(Default)]
pub struct MockConnectivity {
    offline: AtomicBool,
    listeners: Mutex<Vec<ConnectivityListener>>,
}

impl MockConnectivity {
    pub fn set(&self, connected: bool) {
        self.offline.store(!connected, Ordering::SeqCst);
        for listener in self.listeners.lock().unwrap().iter() {
            listener(connected);
        }
    }
}

#[async_trait]
impl Connectivity for MockConnectivity {
    async fn is_connected(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: ConnectivityListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<NaiveDate>>,
    cancels: AtomicUsize,
}

impl RecordingScheduler {
    pub fn scheduled(&self) -> Vec<NaiveDate> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationScheduler for RecordingScheduler {
    async fn schedule_all(&self, day: &DayPrayerTimes, _settings: &PrayerSettings) -> PortResult<()> {
        self.scheduled.lock().unwrap().push(day.date);
        Ok(())
    }

    async fn cancel_all(&self) -> PortResult<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FixedLocator(pub GeoFix);

#[async_trait]
impl LocationProvider for FixedLocator {
    async fn current_location(&self) -> PortResult<GeoFix> {
        Ok(self.0.clone())
    }
}

/// Reads fine, never writes.
pub struct ReadOnlyStore;

#[async_trait]
impl SettingsStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> PortResult<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value) -> PortResult<()> {
        Err(PortError::Unexpected("disk full".into()))
    }
}

pub struct Harness {
    pub service: PrayerTimesService,
    pub clock: Arc<ManualClock>,
    pub fetcher: Arc<MockFetcher>,
    pub network: Arc<MockConnectivity>,
    pub notifier: Arc<RecordingScheduler>,
    pub store: Arc<MemoryStore>,
}

pub async fn production() -> Harness {
    build(false).await
}

pub async fn sample() -> Harness {
    build(true).await
}

async fn build(sample: bool) -> Harness {
    let clock = Arc::new(ManualClock::new(at(today(), 9, 0)));
    let fetcher = Arc::new(MockFetcher::default());
    let network = Arc::new(MockConnectivity::default());
    let notifier = Arc::new(RecordingScheduler::default());
    let store = Arc::new(MemoryStore::new());

    let mut builder = PrayerTimesService::builder()
        .clock(clock.clone())
        .connectivity(network.clone())
        .notifier(notifier.clone())
        .store(store.clone())
        .config(ServiceConfig::default());
    builder = if sample {
        builder.source(Arc::new(SampleSource::default()))
    } else {
        builder.source(Arc::new(ProductionSource::new(fetcher.clone(), network.clone())))
    };
    let service = builder.build().await.unwrap();

    Harness { service, clock, fetcher, network, notifier, store }
}
