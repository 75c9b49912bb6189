//! Network collaborators for waqt.
//!
//! Implements the engine's ports over HTTP: the monthly prayer-time
//! calendar, IP geolocation and a connectivity probe.

pub mod aladhan;
pub mod connectivity;
pub mod geo;

pub use aladhan::AladhanClient;
pub use connectivity::HttpConnectivity;
#[cfg(feature = "local-geo")]
pub use geo::LocalGeoProvider;
pub use geo::{IpLocationProvider, LocationInfo};
