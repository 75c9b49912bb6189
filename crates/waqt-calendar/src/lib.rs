//! Calendar helpers for waqt: clock-time adjustment and formatting, month
//! keys, lenient date parsing and Hijri labels.

pub mod error;
pub mod hijri;
pub mod month;
pub mod time;

pub use error::CalendarError;
pub use hijri::{hijri_label, to_hijri};
pub use month::{MonthKey, month_key, parse_date_lenient};
pub use time::{ClockTime, MINUTES_PER_DAY, adjust_time, format_time, minutes_of, strip_annotation};
