//! Offline demonstration data.
//!
//! Generates one fixed Gregorian month of plausible prayer times without any
//! network access, and maps the device's real day onto that month so "today"
//! always has data.

use chrono::{Datelike, NaiveDate};
use waqt_calendar::{ClockTime, MonthKey, hijri};
use waqt_types::{CalculationMethod, DayPrayerTimes, Location, PrayerError, PrayerName};

/// Demonstration month used when none is configured.
pub const DEFAULT_DEMO_YEAR: i32 = 2025;
pub const DEFAULT_DEMO_MONTH: u32 = 6;

/// Minutes since midnight on day 1, and the number of days per one-minute
/// drift, for each prayer in order. Sunrise creeps earlier and sunset later
/// through the month, so fajr drifts back and the evening prayers forward.
const BASE_MINUTES: [(i32, i32); 5] = [
    (4 * 60 + 12, -6),
    (12 * 60 + 18, 9),
    (15 * 60 + 38, 8),
    (19 * 60 + 2, 5),
    (20 * 60 + 32, 5),
];

/// The fixed month that sample data is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleCalendar {
    month: MonthKey,
}

impl Default for SampleCalendar {
    fn default() -> Self {
        Self { month: MonthKey { year: DEFAULT_DEMO_YEAR, month: DEFAULT_DEMO_MONTH } }
    }
}

impl SampleCalendar {
    /// # Errors
    /// `InvalidConfiguration` when the month is not 1..=12 or the year cannot
    /// be labelled in the Hijri calendar.
    pub fn new(year: i32, month: u32) -> Result<Self, PrayerError> {
        let key = MonthKey::new(year, month)
            .ok_or_else(|| PrayerError::invalid_config(format!("Invalid demo month {}-{}", year, month)))?;
        if !hijri::is_supported_year(year) {
            return Err(PrayerError::invalid_config(format!(
                "Demo year {} outside supported range ({}-{})",
                year,
                hijri::HIJRI_MIN_YEAR,
                hijri::HIJRI_MAX_YEAR
            )));
        }
        Ok(Self { month: key })
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.month.year
    }

    pub fn days(&self) -> u32 {
        self.month.days()
    }

    pub fn is_date_in_sample_range(&self, date: NaiveDate) -> bool {
        self.month.contains(date)
    }

    /// Maps the real `today` onto a day of the demonstration month.
    ///
    /// Inside the demo month the real day is used; otherwise the day of month
    /// wraps as `((day - 1) mod N) + 1`. Callers compute this once per session.
    pub fn initial_date(&self, today: NaiveDate) -> NaiveDate {
        let n = self.days();
        let day = if MonthKey::of(today) == self.month {
            today.day().min(n)
        } else {
            ((today.day() - 1) % n) + 1
        };
        self.month.first_day().with_day(day).unwrap_or(self.month.first_day())
    }

    /// Sample times for `date`, or `None` outside the demonstration month.
    pub fn prayer_times(
        &self,
        date: NaiveDate,
        location: &Location,
        method: &CalculationMethod,
    ) -> Option<DayPrayerTimes> {
        if !self.is_date_in_sample_range(date) {
            return None;
        }
        let offset = date.day() as i32 - 1;
        let raw = BASE_MINUTES.map(|(base, per)| {
            ClockTime::from_minutes(base + offset / per.abs() * per.signum()).to_string()
        });
        let hijri_date = hijri::hijri_label(date).unwrap_or_default();
        Some(DayPrayerTimes::from_raw(
            date,
            hijri_date,
            location.clone(),
            method.clone(),
            raw.each_ref().map(String::as_str),
        ))
    }

    /// Every day of the demonstration month.
    pub fn month_times(&self, location: &Location, method: &CalculationMethod) -> Vec<DayPrayerTimes> {
        self.month
            .dates()
            .filter_map(|d| self.prayer_times(d, location, method))
            .collect()
    }
}

/// Day-one sample time for `name`.
pub fn base_time(name: PrayerName) -> ClockTime {
    ClockTime::from_minutes(BASE_MINUTES[name.index()].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waqt_calendar::minutes_of;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_default_month_is_june_2025() {
        let cal = SampleCalendar::default();
        assert_eq!(cal.month().to_string(), "2025-06");
        assert_eq!(cal.days(), 30);
    }

    #[test]
    fn test_initial_date_inside_demo_month() {
        let cal = SampleCalendar::default();
        assert_eq!(cal.initial_date(d(2025, 6, 17)), d(2025, 6, 17));
    }

    #[test]
    fn test_initial_date_wraps_long_months() {
        let cal = SampleCalendar::default();
        assert_eq!(cal.initial_date(d(2026, 10, 31)), d(2025, 6, 1));
        assert_eq!(cal.initial_date(d(2026, 10, 30)), d(2025, 6, 30));
        assert_eq!(cal.initial_date(d(2026, 10, 19)), d(2025, 6, 19));
    }

    #[test]
    fn test_outside_month_has_no_data() {
        let cal = SampleCalendar::default();
        let loc = Location::mecca();
        let m = CalculationMethod::mwl();
        assert!(cal.prayer_times(d(2025, 7, 1), &loc, &m).is_none());
        assert!(cal.prayer_times(d(2025, 5, 31), &loc, &m).is_none());
        assert!(cal.prayer_times(d(2025, 6, 30), &loc, &m).is_some());
    }

    #[test]
    fn test_times_drift_slowly() {
        let cal = SampleCalendar::default();
        let loc = Location::mecca();
        let m = CalculationMethod::mwl();
        let first = cal.prayer_times(d(2025, 6, 1), &loc, &m).unwrap();
        let last = cal.prayer_times(d(2025, 6, 30), &loc, &m).unwrap();
        assert_eq!(first.prayer(PrayerName::Fajr).time, base_time(PrayerName::Fajr).to_string());
        for p in PrayerName::ALL {
            let a = minutes_of(&first.prayer(p).time).unwrap();
            let b = minutes_of(&last.prayer(p).time).unwrap();
            assert!((a - b).abs() <= 6, "{} drifted {} minutes", p, (a - b).abs());
        }
        assert_ne!(first.hijri_date, last.hijri_date);
    }

    #[test]
    fn test_rejects_bad_demo_month() {
        assert!(SampleCalendar::new(2025, 13).is_err());
        assert!(SampleCalendar::new(1900, 6).is_err());
        assert!(SampleCalendar::new(2024, 2).is_ok());
    }

    #[test]
    fn test_month_times_covers_every_day() {
        let cal = SampleCalendar::new(2024, 2).unwrap();
        let days = cal.month_times(&Location::mecca(), &CalculationMethod::mwl());
        assert_eq!(days.len(), 29);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }
}
