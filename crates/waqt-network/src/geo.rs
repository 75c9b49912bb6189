//! IP-based geolocation.
//!
//! Resolves the device position from its public IP, either through an HTTP
//! lookup service or a local MaxMind database.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use waqt_types::ports::LocationProvider;
use waqt_types::{GeoFix, PortError, PortResult};

pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Location information with coordinates and place name.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    /// Region/Province name (if available).
    pub region: Option<String>,
    pub country: Option<String>,
}

impl LocationInfo {
    /// Returns formatted location string (e.g., "Yogyakarta, Daerah Istimewa Yogyakarta, Indonesia").
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.city.as_deref(), self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        if parts.is_empty() {
            format!("{:.4}°, {:.4}°", self.latitude, self.longitude)
        } else {
            parts.join(", ")
        }
    }

    /// Converts to a fix usable for city-based lookups. Both city and
    /// country are required; the region stands in for a missing city.
    pub fn into_fix(self) -> PortResult<GeoFix> {
        let city = self.city.or(self.region);
        match (city, self.country) {
            (Some(city), Some(country)) => Ok(GeoFix {
                latitude: self.latitude,
                longitude: self.longitude,
                city,
                country,
            }),
            _ => Err(PortError::NotFound(format!(
                "No place name for {:.4}°, {:.4}°",
                self.latitude, self.longitude
            ))),
        }
    }
}

// =============================================================================
// HTTP lookup
// =============================================================================

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, rename = "regionName")]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Resolves the caller's public IP through an `ip-api.com` compatible endpoint.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    client: reqwest::Client,
    url: String,
}

impl IpLocationProvider {
    pub fn new() -> PortResult<Self> {
        Self::with_url(DEFAULT_LOOKUP_URL)
    }

    pub fn with_url(url: impl Into<String>) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, url: url.into() })
    }

    pub async fn lookup(&self) -> PortResult<LocationInfo> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PortError::Network(format!("Geolocation request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(PortError::Network(format!("Geolocation responded with {}", response.status())));
        }
        let data: LookupResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse geolocation response: {}", e)))?;
        if data.status != "success" {
            let reason = data.message.unwrap_or(data.status);
            return Err(PortError::NotFound(format!("Geolocation lookup failed: {}", reason)));
        }
        Ok(LocationInfo {
            latitude: data.lat,
            longitude: data.lon,
            city: data.city.filter(|s| !s.is_empty()),
            region: data.region.filter(|s| !s.is_empty()),
            country: data.country.filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn current_location(&self) -> PortResult<GeoFix> {
        let info = self.lookup().await?;
        debug!("Resolved location {}", info.display_name());
        info.into_fix()
    }
}

// =============================================================================
// Local MaxMind Database Lookup (privacy-preserving, offline)
// =============================================================================

/// Local geolocation provider using MaxMind GeoIP database.
///
/// No data leaves the device; all lookups are performed against the file.
#[cfg(feature = "local-geo")]
#[derive(Debug, Clone)]
pub struct LocalGeoProvider {
    db_path: std::path::PathBuf,
    ip: std::net::IpAddr,
}

#[cfg(feature = "local-geo")]
impl LocalGeoProvider {
    /// A provider that always resolves `ip` against the database at `db_path`.
    pub fn new(db_path: impl Into<std::path::PathBuf>, ip: std::net::IpAddr) -> Self {
        Self { db_path: db_path.into(), ip }
    }

    /// Looks up location information for an IP address using a local MaxMind database.
    ///
    /// # Errors
    /// `PortError::Unexpected` if the database cannot be opened, `NotFound`
    /// when it has no record for the address.
    ///
    /// # Example
    /// ```rust,no_run
    /// use std::net::IpAddr;
    /// use std::path::Path;
    /// use waqt_network::geo::LocalGeoProvider;
    ///
    /// let ip: IpAddr = "8.8.8.8".parse().unwrap();
    /// let db_path = Path::new("/path/to/GeoLite2-City.mmdb");
    ///
    /// let info = LocalGeoProvider::lookup(ip, db_path).unwrap();
    /// println!("Location: {}", info.display_name());
    /// ```
    pub fn lookup(ip: std::net::IpAddr, db_path: &std::path::Path) -> PortResult<LocationInfo> {
        use maxminddb::{Reader, geoip2};

        let reader = Reader::open_readfile(db_path).map_err(|e| {
            PortError::Unexpected(format!("Failed to open MaxMind DB at {:?}: {}", db_path, e))
        })?;

        let city: geoip2::City = reader
            .lookup(ip)
            .map_err(|e| PortError::NotFound(format!("IP lookup failed for {}: {}", ip, e)))?;

        let location = city
            .location
            .ok_or_else(|| PortError::NotFound(format!("No location data for IP {}", ip)))?;

        Ok(LocationInfo {
            latitude: location.latitude.unwrap_or(0.0),
            longitude: location.longitude.unwrap_or(0.0),
            city: city
                .city
                .and_then(|c| c.names)
                .and_then(|n| n.get("en").map(|s| s.to_string())),
            region: city
                .subdivisions
                .and_then(|s| s.into_iter().next())
                .and_then(|s| s.names)
                .and_then(|n| n.get("en").map(|s| s.to_string())),
            country: city
                .country
                .and_then(|c| c.names)
                .and_then(|n| n.get("en").map(|s| s.to_string())),
        })
    }
}

#[cfg(feature = "local-geo")]
#[async_trait]
impl LocationProvider for LocalGeoProvider {
    async fn current_location(&self) -> PortResult<GeoFix> {
        Self::lookup(self.ip, &self.db_path)?.into_fix()
    }
}
