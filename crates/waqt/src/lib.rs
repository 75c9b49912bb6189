//! # Waqt
//!
//! Prayer-time scheduling for apps: resolves the times for any navigable date,
//! caches whole months, applies per-prayer manual adjustments, and runs either
//! on a live monthly fetcher or on an offline demonstration month.
//!
//! This crate is a facade that re-exports functionality from the `waqt` ecosystem.
//!
//! ## Modules
//!
//! - `ports`: Collaborator contracts (monthly fetch, connectivity, location, notifications, storage)
//! - `source`: Sample and production data sources
//! - `cache`: Month and per-day caches
//! - `navigator`: Date navigation rules
//! - `service`: The orchestrator
//! - `network`: HTTP collaborators (optional)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use waqt::prelude::*;
//!
//! # async fn demo() -> Result<(), PrayerError> {
//! let service = PrayerTimesService::builder().build().await?;
//! let today = service.fetch_prayer_times(None, false).await?;
//! println!("Fajr at {}", today.prayer(PrayerName::Fajr).time);
//! # Ok(())
//! # }
//! ```

pub use waqt_core::*;
