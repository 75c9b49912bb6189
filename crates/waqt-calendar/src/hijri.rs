use chrono::{Datelike, NaiveDate};
use hijri_date::HijriDate;
use std::cell::RefCell;

use crate::error::CalendarError;

/// Minimum Gregorian year for Hijri conversion.
pub const HIJRI_MIN_YEAR: i32 = 1938;
/// Maximum Gregorian year for Hijri conversion.
pub const HIJRI_MAX_YEAR: i32 = 2076;

impl CalendarError {
    /// Creates a `DateOutOfRange` error with the Hijri conversion bounds.
    pub fn date_out_of_range(date: NaiveDate) -> Self {
        Self::DateOutOfRange {
            date,
            min: NaiveDate::from_ymd_opt(HIJRI_MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN),
            max: NaiveDate::from_ymd_opt(HIJRI_MAX_YEAR, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Whether `year` can be converted to the Hijri calendar.
pub fn is_supported_year(year: i32) -> bool {
    (HIJRI_MIN_YEAR..=HIJRI_MAX_YEAR).contains(&year)
}

// Last conversion: gregorian -> (hijri_year, month, day)
thread_local! {
    static HIJRI_CACHE: RefCell<Option<(NaiveDate, usize, usize, usize)>> = const { RefCell::new(None) };
}

/// Converts a Gregorian date to its Hijri `(year, month, day)`.
///
/// Month views convert consecutive days, so the last result is kept per thread.
///
/// # Errors
/// Returns `DateOutOfRange` outside 1938-2076.
pub fn to_hijri(date: NaiveDate) -> Result<(usize, usize, usize), CalendarError> {
    let cached = HIJRI_CACHE.with(|cache| {
        cache
            .borrow()
            .as_ref()
            .and_then(|(d, y, m, day)| (*d == date).then_some((*y, *m, *day)))
    });
    if let Some(hit) = cached {
        return Ok(hit);
    }

    if !is_supported_year(date.year()) {
        return Err(CalendarError::date_out_of_range(date));
    }

    let hijri = HijriDate::from_gr(date.year() as usize, date.month() as usize, date.day() as usize)
        .map_err(|_| CalendarError::date_out_of_range(date))?;
    let ymd = (hijri.year(), hijri.month(), hijri.day());

    HIJRI_CACHE.with(|cache| {
        *cache.borrow_mut() = Some((date, ymd.0, ymd.1, ymd.2));
    });

    Ok(ymd)
}

/// Returns Hijri month name.
pub fn get_hijri_month_name(month: usize) -> &'static str {
    match month {
        1 => "Muharram",
        2 => "Safar",
        3 => "Rabi' al-Awwal",
        4 => "Rabi' al-Thani",
        5 => "Jumada al-Ula",
        6 => "Jumada al-Akhirah",
        7 => "Rajab",
        8 => "Sha'ban",
        9 => "Ramadhan",
        10 => "Shawwal",
        11 => "Dhu al-Qi'dah",
        12 => "Dhu al-Hijjah",
        _ => "Unknown",
    }
}

/// Formats the Hijri date of `date`, e.g. `"5 Dhu al-Hijjah 1446 AH"`.
pub fn hijri_label(date: NaiveDate) -> Result<String, CalendarError> {
    let (year, month, day) = to_hijri(date)?;
    Ok(format_hijri(year, month, day))
}

pub fn format_hijri(year: usize, month: usize, day: usize) -> String {
    format!("{} {} {} AH", day, get_hijri_month_name(month), year)
}
