//! Monthly prayer-time calendar from the Aladhan API.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use waqt_calendar::strip_annotation;
use waqt_types::ports::MonthlyTimesFetcher;
use waqt_types::{CalculationMethod, DayPrayerTimes, Location, PortError, PortResult};

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com";

const USER_AGENT: &str = concat!("waqt/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    code: u16,
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    timings: Timings,
    date: DateInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Timings {
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct DateInfo {
    gregorian: GregorianDate,
    hijri: HijriDate,
}

#[derive(Debug, Deserialize)]
struct GregorianDate {
    /// `DD-MM-YYYY`
    date: String,
}

#[derive(Debug, Deserialize)]
struct HijriDate {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    en: String,
}

impl HijriDate {
    fn label(&self) -> String {
        let day = self.day.trim_start_matches('0');
        format!("{} {} {} AH", day, self.month.en, self.year)
    }
}

/// HTTP client for `calendarByCity`.
#[derive(Debug, Clone)]
pub struct AladhanClient {
    client: reqwest::Client,
    base_url: String,
}

impl AladhanClient {
    pub fn new() -> PortResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at another host, e.g. a mirror or a test server.
    pub fn with_base_url(base_url: impl Into<String>) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MonthlyTimesFetcher for AladhanClient {
    async fn fetch_month(
        &self,
        location: &Location,
        method: &CalculationMethod,
        year: i32,
        month: u32,
    ) -> PortResult<Vec<DayPrayerTimes>> {
        let url = format!("{}/v1/calendarByCity/{}/{}", self.base_url, year, month);
        debug!("Fetching {}-{:02} for {} from {}", year, month, location, url);

        let method_id = method.id.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("city", location.city.as_str()),
                ("country", location.country.as_str()),
                ("method", method_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Network(format!("Aladhan request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Aladhan responded with {} for {}-{:02}", status, year, month);
            return Err(PortError::Network(format!("Aladhan responded with {}", status)));
        }

        let body: CalendarResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse Aladhan response: {}", e)))?;
        if body.code != 200 {
            return Err(PortError::NotFound(format!(
                "No calendar for {}-{:02} in {}: {} {}",
                year, month, location, body.code, body.status
            )));
        }

        body.data
            .into_iter()
            .map(|day| to_day(day, location, method))
            .collect()
    }
}

fn to_day(day: CalendarDay, location: &Location, method: &CalculationMethod) -> PortResult<DayPrayerTimes> {
    let date = NaiveDate::parse_from_str(&day.date.gregorian.date, "%d-%m-%Y").map_err(|e| {
        PortError::Unexpected(format!("Bad date {:?}: {}", day.date.gregorian.date, e))
    })?;
    let t = &day.timings;
    Ok(DayPrayerTimes::from_raw(
        date,
        day.date.hijri.label(),
        location.clone(),
        method.clone(),
        [
            strip_annotation(&t.fajr),
            strip_annotation(&t.dhuhr),
            strip_annotation(&t.asr),
            strip_annotation(&t.maghrib),
            strip_annotation(&t.isha),
        ],
    ))
}
