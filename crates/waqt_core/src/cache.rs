//! Month and per-day caches.
//!
//! The month cache keeps the current month indefinitely. Every insert of a
//! non-current month arms its own purge deadline; when any deadline passes,
//! every non-current month cached at or before it is evicted. Deadlines are
//! checked on access, so the cache needs no timer thread.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::debug;
use waqt_calendar::MonthKey;
use waqt_types::DayPrayerTimes;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthEntry {
    pub data: Vec<DayPrayerTimes>,
    pub is_current: bool,
    pub fetched_at: NaiveDateTime,
}

impl MonthEntry {
    pub fn day(&self, date: NaiveDate) -> Option<&DayPrayerTimes> {
        self.data.iter().find(|d| d.date == date)
    }
}

#[derive(Debug)]
pub struct MonthCache {
    entries: HashMap<MonthKey, MonthEntry>,
    purges: SmallVec<[NaiveDateTime; 4]>,
    purge_delay: Duration,
}

impl MonthCache {
    pub fn new(purge_delay: Duration) -> Self {
        Self { entries: HashMap::new(), purges: SmallVec::new(), purge_delay }
    }

    pub fn get(&mut self, key: MonthKey, now: NaiveDateTime) -> Option<&MonthEntry> {
        self.sweep(now);
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: MonthKey, data: Vec<DayPrayerTimes>, is_current: bool, now: NaiveDateTime) {
        self.sweep(now);
        if is_current {
            // a new current month demotes the old one
            let mut demoted = false;
            for (k, entry) in self.entries.iter_mut() {
                if *k != key && entry.is_current {
                    entry.is_current = false;
                    demoted = true;
                }
            }
            if demoted {
                self.purges.push(now + self.purge_delay);
            }
        } else {
            self.purges.push(now + self.purge_delay);
        }
        self.entries.insert(key, MonthEntry { data, is_current, fetched_at: now });
    }

    /// Fires every purge deadline that has passed. Returns the number of evicted months.
    pub fn sweep(&mut self, now: NaiveDateTime) -> usize {
        if !self.purges.iter().any(|d| *d <= now) {
            return 0;
        }
        self.purges.sort_unstable();
        let before = self.entries.len();
        for deadline in self.purges.iter().filter(|d| **d <= now) {
            self.entries
                .retain(|_, e| e.is_current || e.fetched_at > *deadline);
        }
        self.purges.retain(|d| *d > now);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("Purged {} non-current cached months", evicted);
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.purges.clear();
    }

    pub fn contains(&self, key: MonthKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_purges(&self) -> usize {
        self.purges.len()
    }
}

/// Adjusted snapshots keyed by exact date. Never expires on its own.
#[derive(Debug, Default)]
pub struct DayCache {
    entries: HashMap<NaiveDate, DayPrayerTimes>,
}

impl DayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayPrayerTimes> {
        self.entries.get(&date)
    }

    pub fn insert(&mut self, day: DayPrayerTimes) {
        self.entries.insert(day.date, day);
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut DayPrayerTimes> {
        self.entries.values_mut()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
