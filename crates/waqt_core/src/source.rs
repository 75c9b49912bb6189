//! Where month data comes from: the offline demo month or a live fetcher.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;
use waqt_calendar::MonthKey;
use waqt_sample::SampleCalendar;
use waqt_types::ports::{Connectivity, MonthlyTimesFetcher};
use waqt_types::{CalculationMethod, DayPrayerTimes, Location, PrayerError};

/// Operating mode, as seen by the navigation validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Sample(SampleCalendar),
    Production,
}

impl DataMode {
    pub fn is_sample(&self) -> bool {
        matches!(self, DataMode::Sample(_))
    }
}

/// Strategy for resolving months of prayer times.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn mode(&self) -> DataMode;

    /// The session's canonical "today" given the real date.
    fn initial_date(&self, today: NaiveDate) -> NaiveDate;

    /// Whether `key` is the live month that stays cached.
    fn is_current_month(&self, key: MonthKey, today: NaiveDate) -> bool;

    /// Whether `date` can be served at all.
    fn is_in_range(&self, date: NaiveDate) -> bool;

    async fn fetch_month(
        &self,
        key: MonthKey,
        location: &Location,
        method: &CalculationMethod,
    ) -> Result<Vec<DayPrayerTimes>, PrayerError>;
}

/// Serves the generated demonstration month.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource {
    calendar: SampleCalendar,
}

impl SampleSource {
    pub fn new(calendar: SampleCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &SampleCalendar {
        &self.calendar
    }
}

#[async_trait]
impl DataSource for SampleSource {
    fn mode(&self) -> DataMode {
        DataMode::Sample(self.calendar)
    }

    fn initial_date(&self, today: NaiveDate) -> NaiveDate {
        self.calendar.initial_date(today)
    }

    fn is_current_month(&self, key: MonthKey, _today: NaiveDate) -> bool {
        key == self.calendar.month()
    }

    fn is_in_range(&self, date: NaiveDate) -> bool {
        self.calendar.is_date_in_sample_range(date)
    }

    async fn fetch_month(
        &self,
        key: MonthKey,
        location: &Location,
        method: &CalculationMethod,
    ) -> Result<Vec<DayPrayerTimes>, PrayerError> {
        if key != self.calendar.month() {
            return Err(PrayerError::DataUnavailable(format!("No sample data for {}", key)));
        }
        debug!("Generating sample month {}", key);
        Ok(self.calendar.month_times(location, method))
    }
}

/// Fetches live months after confirming connectivity.
pub struct ProductionSource {
    fetcher: Arc<dyn MonthlyTimesFetcher>,
    connectivity: Arc<dyn Connectivity>,
}

impl ProductionSource {
    pub fn new(fetcher: Arc<dyn MonthlyTimesFetcher>, connectivity: Arc<dyn Connectivity>) -> Self {
        Self { fetcher, connectivity }
    }
}

#[async_trait]
impl DataSource for ProductionSource {
    fn mode(&self) -> DataMode {
        DataMode::Production
    }

    fn initial_date(&self, today: NaiveDate) -> NaiveDate {
        today
    }

    fn is_current_month(&self, key: MonthKey, today: NaiveDate) -> bool {
        key == MonthKey::of(today)
    }

    fn is_in_range(&self, _date: NaiveDate) -> bool {
        true
    }

    async fn fetch_month(
        &self,
        key: MonthKey,
        location: &Location,
        method: &CalculationMethod,
    ) -> Result<Vec<DayPrayerTimes>, PrayerError> {
        if !self.connectivity.is_connected().await {
            return Err(PrayerError::Network("No internet connection".to_string()));
        }
        debug!("Fetching {} for {} ({})", key, location, method.name);
        let days = self.fetcher.fetch_month(location, method, key.year, key.month).await?;
        Ok(days)
    }
}
