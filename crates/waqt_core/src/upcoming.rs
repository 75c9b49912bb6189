use chrono::{Duration, NaiveTime, Timelike};
use std::fmt;
use waqt_calendar::{MINUTES_PER_DAY, minutes_of};
use waqt_types::{DayPrayerTimes, PrayerName};

/// The soonest prayer after now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrayer {
    pub name: PrayerName,
    /// Adjusted `HH:MM`.
    pub time: String,
    pub time_until: Duration,
    /// Every prayer today has passed; this is tomorrow's first.
    pub is_tomorrow: bool,
}

impl NextPrayer {
    pub fn label(&self) -> String {
        if self.is_tomorrow {
            "Tomorrow".to_string()
        } else {
            self.name.to_string()
        }
    }

    /// `"2h 05m"`, or `"45m"` under an hour.
    pub fn countdown(&self) -> String {
        let total = self.time_until.num_minutes().max(0);
        match (total / 60, total % 60) {
            (0, m) => format!("{}m", m),
            (h, m) => format!("{}h {:02}m", h, m),
        }
    }
}

impl fmt::Display for NextPrayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (in {})", self.label(), self.time, self.countdown())
    }
}

fn minute_of_day(now: NaiveTime) -> i32 {
    (now.hour() * 60 + now.minute()) as i32
}

fn prayer_minutes(day: &DayPrayerTimes) -> impl Iterator<Item = (PrayerName, &str, i32)> {
    day.prayers
        .iter()
        .filter_map(|p| minutes_of(&p.time).map(|m| (p.name, p.time.as_str(), m)))
}

/// Scans the day in order for the first prayer later than `now`, falling
/// back to the first prayer tomorrow.
pub fn next_prayer(day: &DayPrayerTimes, now: NaiveTime) -> Option<NextPrayer> {
    let current = minute_of_day(now);
    if let Some((name, time, m)) = prayer_minutes(day).find(|(_, _, m)| *m > current) {
        return Some(NextPrayer {
            name,
            time: time.to_string(),
            time_until: Duration::minutes((m - current) as i64),
            is_tomorrow: false,
        });
    }
    prayer_minutes(day).next().map(|(name, time, m)| NextPrayer {
        name,
        time: time.to_string(),
        time_until: Duration::minutes((MINUTES_PER_DAY - current + m) as i64),
        is_tomorrow: true,
    })
}

/// The last prayer whose time has been reached.
pub fn current_prayer(day: &DayPrayerTimes, now: NaiveTime) -> Option<PrayerName> {
    let current = minute_of_day(now);
    prayer_minutes(day)
        .filter(|(_, _, m)| *m <= current)
        .last()
        .map(|(name, _, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use waqt_types::{CalculationMethod, Location};

    fn day() -> DayPrayerTimes {
        DayPrayerTimes::from_raw(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            "",
            Location::mecca(),
            CalculationMethod::mwl(),
            ["04:10", "12:20", "15:40", "19:05", "20:35"],
        )
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_next_prayer_midday() {
        let next = next_prayer(&day(), t(13, 0)).unwrap();
        assert_eq!(next.name, PrayerName::Asr);
        assert_eq!(next.time_until, Duration::minutes(160));
        assert_eq!(next.countdown(), "2h 40m");
        assert_eq!(next.label(), "Asr");
    }

    #[test]
    fn test_next_prayer_exact_time_moves_on() {
        let next = next_prayer(&day(), t(12, 20)).unwrap();
        assert_eq!(next.name, PrayerName::Asr);
    }

    #[test]
    fn test_after_isha_is_tomorrow_fajr() {
        let next = next_prayer(&day(), t(22, 0)).unwrap();
        assert_eq!(next.name, PrayerName::Fajr);
        assert!(next.is_tomorrow);
        assert_eq!(next.label(), "Tomorrow");
        assert_eq!(next.time_until, Duration::minutes(2 * 60 + 4 * 60 + 10));
    }

    #[test]
    fn test_current_prayer() {
        assert_eq!(current_prayer(&day(), t(3, 0)), None);
        assert_eq!(current_prayer(&day(), t(4, 10)), Some(PrayerName::Fajr));
        assert_eq!(current_prayer(&day(), t(16, 0)), Some(PrayerName::Asr));
        assert_eq!(current_prayer(&day(), t(23, 59)), Some(PrayerName::Isha));
    }
}
