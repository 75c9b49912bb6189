use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest manual shift, in minutes, accepted for a single prayer.
pub const ADJUSTMENT_LIMIT: i32 = 30;

/// The five daily prayers.
///
/// Declaration order is the order of the day; "next prayer" and
/// "current prayer" scans rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All prayers in order of the day.
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// Position within [`PrayerName::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PrayerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrayerName::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown prayer name: {}", s))
    }
}

/// A single prayer on a single day.
///
/// `original_time` is the calculated time as delivered by the data source and
/// is never modified. `time` is derived from it by applying `adjustment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTime {
    pub name: PrayerName,
    pub original_time: String,
    pub time: String,
    pub adjustment: i32,
    pub notification_enabled: bool,
}

impl PrayerTime {
    /// Creates an unadjusted prayer with notifications enabled.
    pub fn new(name: PrayerName, original_time: impl Into<String>) -> Self {
        let original_time = original_time.into();
        Self {
            name,
            time: original_time.clone(),
            original_time,
            adjustment: 0,
            notification_enabled: true,
        }
    }
}

/// City and country the times were calculated for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self { city: city.into(), country: country.into() }
    }

    pub fn mecca() -> Self {
        Self::new("Mecca", "Saudi Arabia")
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::mecca()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// A prayer-time calculation convention.
///
/// Ids follow the numbering used by the public Aladhan API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalculationMethod {
    pub id: u8,
    pub name: String,
    pub description: String,
}

const METHODS: &[(u8, &str, &str)] = &[
    (1, "Karachi", "University of Islamic Sciences, Karachi"),
    (2, "ISNA", "Islamic Society of North America"),
    (3, "MWL", "Muslim World League"),
    (4, "Makkah", "Umm Al-Qura University, Makkah"),
    (5, "Egypt", "Egyptian General Authority of Survey"),
    (7, "Tehran", "Institute of Geophysics, University of Tehran"),
    (8, "Gulf", "Gulf Region"),
    (9, "Kuwait", "Kuwait"),
    (10, "Qatar", "Qatar"),
    (11, "Singapore", "Majlis Ugama Islam Singapura, Singapore"),
    (12, "France", "Union Organization Islamic de France"),
    (13, "Turkey", "Diyanet Isleri Baskanligi, Turkey"),
    (14, "Russia", "Spiritual Administration of Muslims of Russia"),
    (15, "Moonsighting", "Moonsighting Committee Worldwide"),
    (16, "Dubai", "Dubai"),
    (17, "JAKIM", "Jabatan Kemajuan Islam Malaysia"),
    (18, "Tunisia", "Tunisia"),
    (19, "Algeria", "Algeria"),
    (20, "KEMENAG", "Kementerian Agama Republik Indonesia"),
    (21, "Morocco", "Morocco"),
    (22, "Portugal", "Comunidade Islamica de Lisboa"),
    (23, "Jordan", "Ministry of Awqaf, Islamic Affairs and Holy Places, Jordan"),
];

impl CalculationMethod {
    pub fn new(id: u8, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id, name: name.into(), description: description.into() }
    }

    /// Looks up a known method by its id.
    pub fn by_id(id: u8) -> Option<Self> {
        METHODS
            .iter()
            .find(|(mid, _, _)| *mid == id)
            .map(|(mid, name, desc)| Self::new(*mid, *name, *desc))
    }

    /// All known methods, ordered by id.
    pub fn catalogue() -> Vec<Self> {
        METHODS.iter().map(|(id, name, desc)| Self::new(*id, *name, *desc)).collect()
    }

    pub fn mwl() -> Self {
        Self::new(3, "MWL", "Muslim World League")
    }
}

impl Default for CalculationMethod {
    fn default() -> Self {
        Self::mwl()
    }
}

/// Prayer times for one Gregorian day at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPrayerTimes {
    pub date: NaiveDate,
    pub hijri_date: String,
    pub location: Location,
    pub method: CalculationMethod,
    /// Always in [`PrayerName::ALL`] order.
    pub prayers: [PrayerTime; 5],
}

impl DayPrayerTimes {
    /// Builds a day from raw times given in [`PrayerName::ALL`] order.
    pub fn from_raw(
        date: NaiveDate,
        hijri_date: impl Into<String>,
        location: Location,
        method: CalculationMethod,
        raw: [&str; 5],
    ) -> Self {
        let prayers = PrayerName::ALL.map(|name| PrayerTime::new(name, raw[name.index()]));
        Self { date, hijri_date: hijri_date.into(), location, method, prayers }
    }

    pub fn prayer(&self, name: PrayerName) -> &PrayerTime {
        &self.prayers[name.index()]
    }

    pub fn prayer_mut(&mut self, name: PrayerName) -> &mut PrayerTime {
        &mut self.prayers[name.index()]
    }
}
