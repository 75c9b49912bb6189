use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// A Gregorian calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Number of days in the month.
    pub fn days(&self) -> u32 {
        let next = self.succ().first_day();
        (next - self.first_day()).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Every date of the month, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days() as i64).map(move |d| first + Duration::days(d))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CalendarError::MalformedDate(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(malformed)?;
        let year = y.parse().map_err(|_| malformed())?;
        let month = m.parse().map_err(|_| malformed())?;
        MonthKey::new(year, month).ok_or_else(malformed)
    }
}

/// Returns the `YYYY-MM` key of `date`.
pub fn month_key(date: NaiveDate) -> String {
    MonthKey::of(date).to_string()
}

/// Parses `YYYY-MM-DD`, rolling an overflowing day into the following month.
///
/// `2025-06-31` becomes `2025-07-01`; `2025-02-30` becomes `2025-03-02`.
/// Day must still be within 1..=31 and month within 1..=12.
pub fn parse_date_lenient(raw: &str) -> Result<NaiveDate, CalendarError> {
    let malformed = || CalendarError::MalformedDate(raw.to_string());
    let mut parts = raw.trim().splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let year: i32 = y.parse().map_err(|_| malformed())?;
    let month: u32 = m.parse().map_err(|_| malformed())?;
    let day: u32 = d.parse().map_err(|_| malformed())?;
    if !(1..=31).contains(&day) {
        return Err(malformed());
    }
    let first = MonthKey::new(year, month).ok_or_else(malformed)?.first_day();
    first
        .checked_add_signed(Duration::days(day as i64 - 1))
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_key_format() {
        assert_eq!(month_key(d(2025, 6, 15)), "2025-06");
        assert_eq!("2025-06".parse::<MonthKey>().unwrap(), MonthKey { year: 2025, month: 6 });
        assert!("2025-13".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_neighbours_cross_years() {
        let jan = MonthKey::new(2025, 1).unwrap();
        assert_eq!(jan.pred(), MonthKey::new(2024, 12).unwrap());
        assert_eq!(jan.pred().succ(), jan);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthKey::new(2025, 6).unwrap().days(), 30);
        assert_eq!(MonthKey::new(2024, 2).unwrap().days(), 29);
        assert_eq!(MonthKey::new(2025, 12).unwrap().dates().count(), 31);
    }

    #[test]
    fn test_lenient_parse_rolls_over() {
        assert_eq!(parse_date_lenient("2025-06-31").unwrap(), d(2025, 7, 1));
        assert_eq!(parse_date_lenient("2025-02-30").unwrap(), d(2025, 3, 2));
        assert_eq!(parse_date_lenient("2025-06-15").unwrap(), d(2025, 6, 15));
    }

    #[test]
    fn test_lenient_parse_rejects_garbage() {
        assert!(parse_date_lenient("2025-06").is_err());
        assert!(parse_date_lenient("2025-13-01").is_err());
        assert!(parse_date_lenient("2025-06-00").is_err());
        assert!(parse_date_lenient("2025-06-32").is_err());
        assert!(parse_date_lenient("tomorrow").is_err());
    }
}
