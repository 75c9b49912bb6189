//! The prayer-times orchestrator.
//!
//! Owns the settings, both caches and the view state. Collaborators are
//! injected through [`ServiceBuilder`]. Locks are never held across an await,
//! so overlapping calls are possible; each fetch takes a request token and
//! only the latest token may change what is displayed.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use waqt_calendar::{MonthKey, format_time};
use waqt_types::ports::{Connectivity, LocationProvider, NotificationScheduler, SettingsStore};
use waqt_types::{
    ADJUSTMENT_LIMIT, CalculationMethod, Clock, DayPrayerTimes, Location, LocationMode,
    PrayerError, PrayerName, PrayerSettings, Rejection, SystemClock, TimeFormat,
};

use crate::cache::{DayCache, MonthCache};
use crate::config::ServiceConfig;
use crate::defaults::{AlwaysConnected, MemoryStore, NoLocationProvider, NoopScheduler};
use crate::navigator::{Navigator, Notice, RetryAction, parse_target};
use crate::settings::{apply_adjustment, apply_preferences, load_settings, save_settings};
use crate::source::{DataMode, DataSource, SampleSource};
use crate::state::{ViewEvent, ViewState};
use crate::upcoming::{NextPrayer, current_prayer, next_prayer};

/// Receives failures the engine logs and swallows.
pub type TelemetryHook = Arc<dyn Fn(&PrayerError) + Send + Sync>;

/// Read-only view of the engine for rendering.
#[derive(Debug, Clone)]
pub struct PrayerTimesSnapshot {
    pub view: ViewState,
    pub current_date: NaiveDate,
    pub initial_date: NaiveDate,
    pub navigating_date: Option<NaiveDate>,
    pub current_times: Option<DayPrayerTimes>,
    pub next_prayer: Option<NextPrayer>,
    pub settings: PrayerSettings,
    pub is_offline: bool,
}

struct Inner {
    settings: PrayerSettings,
    view: ViewState,
    current_date: NaiveDate,
    navigating_date: Option<NaiveDate>,
    day_cache: DayCache,
    month_cache: MonthCache,
    latest_request: u64,
    cache_epoch: u64,
    offline: bool,
    notice: Option<Notice>,
    next_prayer: Option<NextPrayer>,
}

impl Inner {
    fn transition(&mut self, event: ViewEvent) {
        let state = std::mem::replace(&mut self.view, ViewState::Idle);
        self.view = state.on(event);
    }
}

pub struct ServiceBuilder {
    source: Arc<dyn DataSource>,
    connectivity: Arc<dyn Connectivity>,
    locator: Arc<dyn LocationProvider>,
    notifier: Arc<dyn NotificationScheduler>,
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    telemetry: Option<TelemetryHook>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            source: Arc::new(SampleSource::default()),
            connectivity: Arc::new(AlwaysConnected),
            locator: Arc::new(NoLocationProvider),
            notifier: Arc::new(NoopScheduler),
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(SystemClock),
            config: ServiceConfig::default(),
            telemetry: None,
        }
    }
}

impl ServiceBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn source(mut self, source: Arc<dyn DataSource>) -> Self { self.source = source; self }
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self { self.connectivity = connectivity; self }
    pub fn locator(mut self, locator: Arc<dyn LocationProvider>) -> Self { self.locator = locator; self }
    pub fn notifier(mut self, notifier: Arc<dyn NotificationScheduler>) -> Self { self.notifier = notifier; self }
    pub fn store(mut self, store: Arc<dyn SettingsStore>) -> Self { self.store = store; self }
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self { self.clock = clock; self }
    pub fn config(mut self, config: ServiceConfig) -> Self { self.config = config; self }
    pub fn telemetry(mut self, hook: TelemetryHook) -> Self { self.telemetry = Some(hook); self }

    /// Validates the config, loads settings once and fixes the session's "today".
    pub async fn build(self) -> Result<PrayerTimesService, PrayerError> {
        self.config.validate()?;
        let settings = load_settings(self.store.as_ref()).await;
        let initial_date = self.source.initial_date(self.clock.today());
        info!("Prayer times service ready, today is {} ({:?})", initial_date, self.source.mode());
        let inner = Inner {
            settings,
            view: ViewState::Idle,
            current_date: initial_date,
            navigating_date: None,
            day_cache: DayCache::new(),
            month_cache: MonthCache::new(self.config.month_purge_delay()),
            latest_request: 0,
            cache_epoch: 0,
            offline: false,
            notice: None,
            next_prayer: None,
        };
        Ok(PrayerTimesService {
            source: self.source,
            connectivity: self.connectivity,
            locator: self.locator,
            notifier: self.notifier,
            store: self.store,
            clock: self.clock,
            config: self.config,
            telemetry: self.telemetry,
            initial_date,
            inner: Mutex::new(inner),
        })
    }
}

pub struct PrayerTimesService {
    source: Arc<dyn DataSource>,
    connectivity: Arc<dyn Connectivity>,
    locator: Arc<dyn LocationProvider>,
    notifier: Arc<dyn NotificationScheduler>,
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    telemetry: Option<TelemetryHook>,
    initial_date: NaiveDate,
    inner: Mutex<Inner>,
}

impl PrayerTimesService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn report(&self, error: &PrayerError) {
        warn!("{}", error);
        if let Some(hook) = &self.telemetry {
            hook(error);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The session's "today"; in sample mode, mapped into the demo month.
    pub fn initial_date(&self) -> NaiveDate {
        self.initial_date
    }

    pub fn current_date(&self) -> NaiveDate {
        self.lock().current_date
    }

    pub fn mode(&self) -> DataMode {
        self.source.mode()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn settings(&self) -> PrayerSettings {
        self.lock().settings.clone()
    }

    pub fn view(&self) -> ViewState {
        self.lock().view.clone()
    }

    pub fn current_times(&self) -> Option<DayPrayerTimes> {
        self.lock().view.displayed().cloned()
    }

    pub fn snapshot(&self) -> PrayerTimesSnapshot {
        let inner = self.lock();
        PrayerTimesSnapshot {
            view: inner.view.clone(),
            current_date: inner.current_date,
            initial_date: self.initial_date,
            navigating_date: inner.navigating_date,
            current_times: inner.view.displayed().cloned(),
            next_prayer: inner.next_prayer.clone(),
            settings: inner.settings.clone(),
            is_offline: inner.offline,
        }
    }

    /// Removes and returns the pending user-facing notice.
    pub fn take_notice(&self) -> Option<Notice> {
        self.lock().notice.take()
    }

    pub fn month_key(&self, date: NaiveDate) -> MonthKey {
        MonthKey::of(date)
    }

    pub fn is_current_month(&self, key: MonthKey) -> bool {
        self.source.is_current_month(key, self.clock.today())
    }

    /// Renders `time` in the user's clock format.
    pub fn format_time(&self, time: &str) -> String {
        let format = self.lock().settings.time_format;
        format_time(time, format)
    }

    /// Upcoming prayer, only while today's times are shown.
    pub fn get_next_prayer(&self) -> Option<NextPrayer> {
        let inner = self.lock();
        self.next_prayer_for(&inner)
    }

    fn next_prayer_for(&self, inner: &Inner) -> Option<NextPrayer> {
        if inner.current_date != self.initial_date {
            return None;
        }
        let day = inner.view.displayed().filter(|d| d.date == self.initial_date)?;
        next_prayer(day, self.clock.now().time())
    }

    /// Last prayer whose time has passed on the displayed day.
    pub fn get_current_prayer(&self) -> Option<PrayerName> {
        let inner = self.lock();
        let day = inner.view.displayed()?;
        current_prayer(day, self.clock.now().time())
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Resolves and displays `date` (default: the session's today).
    ///
    /// The per-day cache is consulted first unless `force_refresh`; on a miss
    /// the month is resolved through the month cache or the data source.
    pub async fn fetch_prayer_times(
        &self,
        date: Option<NaiveDate>,
        force_refresh: bool,
    ) -> Result<DayPrayerTimes, PrayerError> {
        let date = date.unwrap_or(self.initial_date);
        let token = {
            let mut inner = self.lock();
            inner.latest_request += 1;
            let token = inner.latest_request;

            let cached = if force_refresh { None } else { inner.day_cache.get(date).cloned() };
            if let Some(mut day) = cached {
                debug!("Day cache hit for {}", date);
                apply_preferences(&mut day, &inner.settings);
                inner.transition(ViewEvent::Resolved(day.clone()));
                inner.current_date = date;
                inner.navigating_date = None;
                inner.next_prayer = self.next_prayer_for(&inner);
                return Ok(day);
            }
            inner.transition(ViewEvent::Load(date));
            token
        };

        let result = self.resolve(date, force_refresh).await;

        let committed = {
            let mut inner = self.lock();
            let latest = token == inner.latest_request;
            if latest || inner.navigating_date == Some(date) {
                inner.navigating_date = None;
            }
            if !latest {
                debug!("Discarding superseded result for {}", date);
                return Err(PrayerError::Superseded { date });
            }
            match result {
                Ok(mut day) => {
                    // preferences may have changed while the fetch was in flight
                    let settings = inner.settings.clone();
                    apply_preferences(&mut day, &settings);
                    inner.transition(ViewEvent::Resolved(day.clone()));
                    inner.current_date = date;
                    inner.next_prayer = self.next_prayer_for(&inner);
                    (day, settings)
                }
                Err(error) => {
                    warn!("Failed to load prayer times for {}: {}", date, error);
                    let dismiss_at = self.clock.now() + self.config.error_display();
                    inner.transition(ViewEvent::Failed { error: error.clone(), dismiss_at });
                    inner.next_prayer = None;
                    return Err(error);
                }
            }
        };

        let (day, settings) = committed;
        if self.should_schedule(date) {
            self.schedule(&day, &settings).await;
        }
        Ok(day)
    }

    async fn resolve(&self, date: NaiveDate, force_refresh: bool) -> Result<DayPrayerTimes, PrayerError> {
        if !self.source.is_in_range(date) {
            return Err(PrayerError::DataUnavailable(format!("{} is outside the available data", date)));
        }
        let (settings, epoch) = {
            let inner = self.lock();
            (inner.settings.clone(), inner.cache_epoch)
        };
        let month = self.load_month(MonthKey::of(date), force_refresh, &settings, epoch).await?;
        let mut day = month
            .into_iter()
            .find(|d| d.date == date)
            .ok_or_else(|| PrayerError::DataUnavailable(format!("No prayer times for {}", date)))?;

        let mut inner = self.lock();
        apply_preferences(&mut day, &inner.settings);
        if inner.cache_epoch == epoch {
            inner.day_cache.insert(day.clone());
        }
        Ok(day)
    }

    /// Returns every day of the month containing `date`, cached or fetched.
    pub async fn fetch_month(&self, date: NaiveDate, force_refresh: bool) -> Result<Vec<DayPrayerTimes>, PrayerError> {
        let (settings, epoch) = {
            let inner = self.lock();
            (inner.settings.clone(), inner.cache_epoch)
        };
        self.load_month(MonthKey::of(date), force_refresh, &settings, epoch).await
    }

    async fn load_month(
        &self,
        key: MonthKey,
        force_refresh: bool,
        settings: &PrayerSettings,
        epoch: u64,
    ) -> Result<Vec<DayPrayerTimes>, PrayerError> {
        if !force_refresh {
            let now = self.clock.now();
            let mut inner = self.lock();
            if let Some(entry) = inner.month_cache.get(key, now) {
                debug!("Month cache hit for {}", key);
                return Ok(entry.data.clone());
            }
        }

        let location = settings.location.effective();
        let mut data = self
            .source
            .fetch_month(key, &location, &settings.calculation_method)
            .await?;
        for day in data.iter_mut() {
            apply_preferences(day, settings);
        }

        let is_current = self.source.is_current_month(key, self.clock.today());
        let now = self.clock.now();
        let mut inner = self.lock();
        if inner.cache_epoch == epoch {
            inner.month_cache.insert(key, data.clone(), is_current, now);
        } else {
            debug!("Caches were cleared while fetching {}, not caching", key);
        }
        Ok(data)
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Validates and then displays `date`. Returns whether the UI should
    /// treat the navigation as successful; failures leave a [`Notice`].
    pub async fn navigate_to_date(&self, date: NaiveDate) -> bool {
        let today = self.clock.today();
        let navigator = Navigator::new(
            self.source.mode(),
            self.connectivity.as_ref(),
            self.config.navigation_window(),
        );
        if let Err(rejection) = navigator.validate(date, today).await {
            info!("Navigation to {} rejected: {}", date, rejection);
            let mut inner = self.lock();
            if rejection == Rejection::NoInternetConnection {
                inner.offline = true;
            }
            inner.notice = Some(Notice::from_error(&PrayerError::from(rejection), date));
            return false;
        }

        self.lock().navigating_date = Some(date);
        match self.fetch_prayer_times(Some(date), false).await {
            Ok(_) => true,
            Err(PrayerError::Superseded { .. }) => false,
            Err(error) => {
                let mut inner = self.lock();
                if error.is_retryable() {
                    inner.offline = true;
                }
                inner.notice = Some(Notice::from_error(&error, date));
                false
            }
        }
    }

    /// Navigates to a raw `YYYY-MM-DD` target; day overflow rolls into the next month.
    pub async fn navigate_to(&self, raw: &str) -> bool {
        match parse_target(raw) {
            Ok(date) => self.navigate_to_date(date).await,
            Err(rejection) => {
                info!("Navigation target {:?} rejected: {}", raw, rejection);
                let date = self.current_date();
                self.lock().notice = Some(Notice::from_error(&PrayerError::from(rejection), date));
                false
            }
        }
    }

    /// Runs the retry path offered by a notice.
    pub async fn retry(&self, action: &RetryAction) -> bool {
        match action {
            RetryAction::Navigate(date) => {
                let connected = self.connectivity.is_connected().await;
                self.set_connectivity(connected);
                if !connected {
                    self.lock().notice = Some(Notice::from_error(
                        &PrayerError::from(Rejection::NoInternetConnection),
                        *date,
                    ));
                    return false;
                }
                self.navigate_to_date(*date).await
            }
        }
    }

    // ── Preferences ──────────────────────────────────────────────────

    /// Sets one prayer's manual shift and recomputes its displayed time.
    pub async fn update_prayer_adjustment(&self, prayer: PrayerName, minutes: i32) -> Result<(), PrayerError> {
        check_adjustment(minutes)?;
        {
            let mut inner = self.lock();
            inner.settings.time_adjustments.insert(prayer, minutes);
            if let Some(day) = inner.view.displayed_mut() {
                apply_adjustment(day, prayer, minutes);
            }
            for day in inner.day_cache.values_mut() {
                apply_adjustment(day, prayer, minutes);
            }
            inner.next_prayer = self.next_prayer_for(&inner);
        }
        info!("Adjusted {} by {} minutes", prayer, minutes);
        self.persist().await;
        self.reschedule().await;
        Ok(())
    }

    /// Replaces every prayer's shift with `minutes`.
    pub async fn apply_all_adjustments(&self, minutes: i32) -> Result<(), PrayerError> {
        check_adjustment(minutes)?;
        {
            let mut inner = self.lock();
            inner.settings.time_adjustments = PrayerName::ALL.into_iter().map(|p| (p, minutes)).collect();
            let settings = inner.settings.clone();
            if let Some(day) = inner.view.displayed_mut() {
                apply_preferences(day, &settings);
            }
            for day in inner.day_cache.values_mut() {
                apply_preferences(day, &settings);
            }
            inner.next_prayer = self.next_prayer_for(&inner);
        }
        info!("Adjusted all prayers by {} minutes", minutes);
        self.persist().await;
        self.reschedule().await;
        Ok(())
    }

    /// Flips the notification flag for `prayer`, returning the new value.
    pub async fn toggle_prayer_notification(&self, prayer: PrayerName) -> bool {
        let enabled = {
            let mut inner = self.lock();
            let enabled = !inner.settings.notification(prayer);
            inner.settings.notifications.insert(prayer, enabled);
            if let Some(day) = inner.view.displayed_mut() {
                day.prayer_mut(prayer).notification_enabled = enabled;
            }
            for day in inner.day_cache.values_mut() {
                day.prayer_mut(prayer).notification_enabled = enabled;
            }
            enabled
        };
        self.persist().await;
        self.reschedule().await;
        enabled
    }

    /// Switches to a manual `city`, or to the device location when `None`.
    /// Either way every cached computation is dropped and the current date refetched.
    pub async fn update_location(&self, city: Option<Location>) -> Result<(), PrayerError> {
        match city {
            Some(city) => {
                info!("Switching to manual location {}", city);
                let mut inner = self.lock();
                inner.settings.location.mode = LocationMode::Manual;
                inner.settings.location.selected_city = Some(city);
            }
            None => {
                let fix = self.locator.current_location().await.map_err(|e| {
                    let error = PrayerError::from(e);
                    warn!("Could not resolve device location: {}", error);
                    error
                })?;
                info!("Switching to device location {}, {}", fix.city, fix.country);
                let mut inner = self.lock();
                inner.settings.location.mode = LocationMode::Auto;
                inner.settings.location.last_fix = Some(fix);
            }
        }
        self.persist().await;
        self.invalidate_and_refetch().await
    }

    pub async fn update_calculation_method(&self, method: CalculationMethod) -> Result<(), PrayerError> {
        info!("Switching calculation method to {}", method.name);
        self.lock().settings.calculation_method = method;
        self.persist().await;
        self.invalidate_and_refetch().await
    }

    pub async fn update_time_format(&self, format: TimeFormat) {
        self.lock().settings.time_format = format;
        self.persist().await;
    }

    /// Edits the remaining preferences (audio, adhan, vibration, snooze, fades,
    /// volume). Adjustments, location and method have dedicated operations.
    pub async fn update_settings(&self, edit: impl FnOnce(&mut PrayerSettings)) {
        let mut next = self.settings();
        edit(&mut next);
        {
            let mut inner = self.lock();
            next.time_adjustments = inner.settings.time_adjustments.clone();
            next.notifications = inner.settings.notifications.clone();
            next.location = inner.settings.location.clone();
            next.calculation_method = inner.settings.calculation_method.clone();
            inner.settings = next;
        }
        self.persist().await;
        self.reschedule().await;
    }

    /// Drops both caches. Fetches already in flight will not repopulate them.
    pub fn clear_caches(&self) {
        let mut inner = self.lock();
        inner.day_cache.clear();
        inner.month_cache.clear();
        inner.cache_epoch += 1;
        info!("Cleared prayer time caches");
    }

    async fn invalidate_and_refetch(&self) -> Result<(), PrayerError> {
        self.clear_caches();
        if let Err(e) = self.notifier.cancel_all().await {
            self.report(&PrayerError::from(e));
        }
        let date = self.current_date();
        self.fetch_prayer_times(Some(date), true).await.map(|_| ())
    }

    async fn persist(&self) {
        let settings = self.settings();
        if let Err(e) = save_settings(self.store.as_ref(), &settings).await {
            self.report(&e);
        }
    }

    fn should_schedule(&self, date: NaiveDate) -> bool {
        !self.source.mode().is_sample() && date == self.clock.today()
    }

    async fn schedule(&self, day: &DayPrayerTimes, settings: &PrayerSettings) {
        debug!("Scheduling notifications for {}", day.date);
        if let Err(e) = self.notifier.schedule_all(day, settings).await {
            self.report(&PrayerError::from(e));
        }
    }

    async fn reschedule(&self) {
        let today = self.clock.today();
        if !self.should_schedule(today) {
            return;
        }
        let (day, settings) = {
            let inner = self.lock();
            (inner.day_cache.get(today).cloned(), inner.settings.clone())
        };
        if let Some(day) = day {
            self.schedule(&day, &settings).await;
        }
    }

    // ── Timers and connectivity ──────────────────────────────────────

    /// Fires due timers: month purges, banner expiry and the next-prayer refresh.
    pub fn tick(&self) -> Option<NextPrayer> {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.month_cache.sweep(now);
        inner.transition(ViewEvent::Tick(now));
        inner.next_prayer = self.next_prayer_for(&inner);
        inner.next_prayer.clone()
    }

    /// Clears a transient failure banner early.
    pub fn dismiss_error(&self) {
        self.lock().transition(ViewEvent::Dismiss);
    }

    pub fn set_connectivity(&self, connected: bool) {
        let mut inner = self.lock();
        if inner.offline == connected {
            info!("Connectivity changed: {}", if connected { "online" } else { "offline" });
        }
        inner.offline = !connected;
    }

    /// Follows the connectivity collaborator's change notifications.
    pub fn attach_connectivity(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.connectivity.subscribe(Arc::new(move |connected| {
            if let Some(service) = weak.upgrade() {
                service.set_connectivity(connected);
            }
        }));
    }
}

fn check_adjustment(minutes: i32) -> Result<(), PrayerError> {
    if !(-ADJUSTMENT_LIMIT..=ADJUSTMENT_LIMIT).contains(&minutes) {
        warn!("Rejected adjustment of {} minutes", minutes);
        return Err(PrayerError::InvalidAdjustment { minutes });
    }
    Ok(())
}
