mod common;

use anyhow::Result;
use chrono::Duration;
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use waqt_core::{
    CalculationMethod, ErrorKind, GeoFix, Location, LocationMode, PrayerError, PrayerName,
    PrayerTimesService, RetryAction, SampleCalendar, TimeFormat, ViewState, adjust_time,
};

// ── Sample mode ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_sample_initial_date_is_mapped_into_demo_month() {
    let h = sample().await;
    let expected = SampleCalendar::default().initial_date(today());
    assert_eq!(h.service.initial_date(), expected);
    assert_eq!(h.service.initial_date(), d(2025, 6, 19));
    assert_eq!(h.service.current_date(), expected);
}

#[tokio::test]
async fn test_sample_navigation_edges() {
    let h = sample().await;

    assert!(!h.service.navigate_to("2025-06-31").await);
    let notice = h.service.take_notice().unwrap();
    assert!(notice.message.contains("no next month data"));
    assert_eq!(notice.retry, None);

    assert!(!h.service.navigate_to("2025-05-15").await);
    assert!(h.service.take_notice().unwrap().message.contains("month not available"));

    assert!(!h.service.navigate_to("2025-05-31").await);
    assert!(h.service.take_notice().unwrap().message.contains("beginning of sample data"));

    assert!(!h.service.navigate_to("2024-06-15").await);
    assert!(h.service.take_notice().unwrap().message.contains("out of demo year range"));

    assert!(!h.service.navigate_to("15/06/2025").await);
    assert_eq!(h.service.take_notice().unwrap().kind, ErrorKind::Validation);

    // nothing was loaded by the rejected attempts
    assert_eq!(h.service.view(), ViewState::Idle);
}

#[tokio::test]
async fn test_sample_navigation_inside_demo_month() {
    let h = sample().await;
    assert!(h.service.navigate_to("2025-06-15").await);
    assert_eq!(h.service.current_date(), d(2025, 6, 15));

    let times = h.service.current_times().unwrap();
    assert_eq!(times.date, d(2025, 6, 15));
    assert_eq!(times.prayers.len(), 5);
    assert_eq!(times.location, Location::mecca());
    assert!(h.service.take_notice().is_none());
}

#[tokio::test]
async fn test_sample_fetch_outside_demo_month_skips_source() {
    let h = sample().await;
    let err = h.service.fetch_prayer_times(Some(d(2025, 7, 4)), false).await.unwrap_err();
    assert_eq!(
        err,
        PrayerError::DataUnavailable("2025-07-04 is outside the available data".into())
    );
    assert!(matches!(h.service.view(), ViewState::Error { stale: None, .. }));
}

#[tokio::test]
async fn test_sample_mode_never_schedules_notifications() {
    let h = sample().await;
    h.service.fetch_prayer_times(None, false).await.unwrap();
    h.service.update_prayer_adjustment(PrayerName::Asr, 3).await.unwrap();
    assert!(h.notifier.scheduled().is_empty());
}

// ── Fetching and caching ─────────────────────────────────────────────

#[tokio::test]
async fn test_day_cache_hit_skips_fetch() -> Result<()> {
    let h = production().await;
    let first = h.service.fetch_prayer_times(None, false).await?;
    let second = h.service.fetch_prayer_times(None, false).await?;
    assert_eq!(first, second);
    assert_eq!(h.fetcher.calls(), 1);

    h.service.fetch_prayer_times(None, true).await?;
    assert_eq!(h.fetcher.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_month_cache_serves_other_days() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    assert!(h.service.navigate_to_date(d(2026, 10, 25)).await);
    assert_eq!(h.fetcher.calls(), 1);

    let month = h.service.fetch_month(d(2026, 10, 1), false).await?;
    assert_eq!(month.len(), 31);
    assert_eq!(h.fetcher.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_other_months_are_purged_after_delay() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;

    assert!(h.service.navigate_to_date(d(2026, 11, 3)).await);
    assert!(h.service.navigate_to_date(d(2026, 11, 4)).await);
    assert_eq!(h.fetcher.calls(), 2);

    h.clock.advance(Duration::seconds(31));
    h.service.tick();
    assert!(h.service.navigate_to_date(d(2026, 11, 5)).await);
    assert_eq!(h.fetcher.calls(), 3);

    // the live month is never purged
    assert!(h.service.navigate_to_date(d(2026, 10, 20)).await);
    assert_eq!(h.fetcher.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_is_current_month() {
    let h = production().await;
    assert!(h.service.is_current_month(h.service.month_key(d(2026, 10, 1))));
    assert!(!h.service.is_current_month(h.service.month_key(d(2026, 11, 1))));
}

#[tokio::test]
async fn test_superseded_fetch_does_not_overwrite() -> Result<()> {
    let h = production().await;
    let service = Arc::new(h.service);
    h.fetcher.hold();

    let older = tokio::spawn({
        let service = service.clone();
        async move { service.fetch_prayer_times(Some(d(2026, 11, 5)), false).await }
    });
    while h.fetcher.calls() < 1 {
        tokio::task::yield_now().await;
    }
    let newer = tokio::spawn({
        let service = service.clone();
        async move { service.fetch_prayer_times(Some(d(2026, 12, 5)), false).await }
    });
    while h.fetcher.calls() < 2 {
        tokio::task::yield_now().await;
    }

    h.fetcher.release(12);
    let newer = newer.await?;
    h.fetcher.release(11);
    let older = older.await?;

    assert_eq!(newer?.date, d(2026, 12, 5));
    assert_eq!(older, Err(PrayerError::Superseded { date: d(2026, 11, 5) }));
    assert_eq!(service.current_date(), d(2026, 12, 5));
    assert_eq!(service.current_times().unwrap().date, d(2026, 12, 5));
    Ok(())
}

// ── Navigation in production ─────────────────────────────────────────

#[tokio::test]
async fn test_window_rejection_happens_before_fetch() {
    let h = production().await;
    assert!(!h.service.navigate_to_date(d(2028, 1, 1)).await);
    assert_eq!(h.fetcher.calls(), 0);
    let notice = h.service.take_notice().unwrap();
    assert!(notice.message.contains("date range exceeded"));
    assert_eq!(notice.retry, None);
}

#[tokio::test]
async fn test_offline_navigation_offers_retry() {
    let h = production().await;
    h.network.set(false);

    let target = d(2026, 11, 5);
    assert!(!h.service.navigate_to_date(target).await);
    assert_eq!(h.fetcher.calls(), 0);
    assert!(h.service.snapshot().is_offline);

    let notice = h.service.take_notice().unwrap();
    assert_eq!(notice.kind, ErrorKind::Network);
    let retry = notice.retry.unwrap();
    assert_eq!(retry, RetryAction::Navigate(target));

    // still offline: retry fails without fetching
    assert!(!h.service.retry(&retry).await);
    assert_eq!(h.fetcher.calls(), 0);

    h.network.set(true);
    assert!(h.service.retry(&retry).await);
    assert_eq!(h.service.current_date(), target);
    assert!(!h.service.snapshot().is_offline);
}

#[tokio::test]
async fn test_connectivity_notifications_update_offline_flag() {
    let h = production().await;
    let service = Arc::new(h.service);
    service.attach_connectivity();

    h.network.set(false);
    assert!(service.snapshot().is_offline);
    h.network.set(true);
    assert!(!service.snapshot().is_offline);
}

// ── Failure handling ─────────────────────────────────────────────────

#[tokio::test]
async fn test_failure_without_data_blocks() {
    let h = production().await;
    h.fetcher.fail(true);

    let err = h.service.fetch_prayer_times(None, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    let view = h.service.view();
    assert!(matches!(view, ViewState::Error { stale: None, dismiss_at: None, .. }));
    h.clock.advance(Duration::minutes(10));
    h.service.tick();
    assert_eq!(h.service.view(), view);
}

#[tokio::test]
async fn test_failure_over_stale_data_expires() -> Result<()> {
    let h = production().await;
    let shown = h.service.fetch_prayer_times(None, false).await?;
    h.fetcher.fail(true);

    assert!(!h.service.navigate_to_date(d(2026, 11, 5)).await);
    assert!(h.service.view().has_stale_data());
    assert_eq!(h.service.current_times().unwrap(), shown);
    assert_eq!(h.service.current_date(), today());
    assert_eq!(h.service.take_notice().unwrap().retry, Some(RetryAction::Navigate(d(2026, 11, 5))));

    h.clock.advance(Duration::seconds(2));
    h.service.tick();
    assert!(h.service.view().has_stale_data());

    h.clock.advance(Duration::seconds(1));
    h.service.tick();
    assert_eq!(h.service.view(), ViewState::Displaying(shown));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ticker_clears_transient_error() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    h.fetcher.fail(true);
    let service = Arc::new(h.service);
    assert!(!service.navigate_to_date(d(2026, 11, 5)).await);
    assert!(service.view().has_stale_data());

    let ticker = service.spawn_ticker();
    h.clock.advance(Duration::seconds(5));
    tokio::time::sleep(std::time::Duration::from_secs(61)).await;

    assert!(matches!(service.view(), ViewState::Displaying(_)));
    ticker.stop();
    Ok(())
}

// ── Preferences ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_adjustments_recompute_from_original_time() -> Result<()> {
    let h = sample().await;
    let day = h.service.fetch_prayer_times(None, false).await?;
    let fajr = day.prayer(PrayerName::Fajr).original_time.clone();

    h.service.update_prayer_adjustment(PrayerName::Fajr, 10).await?;
    let times = h.service.current_times().unwrap();
    assert_eq!(times.prayer(PrayerName::Fajr).adjustment, 10);
    assert_eq!(times.prayer(PrayerName::Fajr).time, adjust_time(&fajr, 10));
    assert_eq!(times.prayer(PrayerName::Dhuhr), day.prayer(PrayerName::Dhuhr));

    h.service.apply_all_adjustments(-5).await?;
    let times = h.service.current_times().unwrap();
    for prayer in &times.prayers {
        assert_eq!(prayer.adjustment, -5);
        assert_eq!(prayer.time, adjust_time(&prayer.original_time, -5));
    }

    h.service.update_prayer_adjustment(PrayerName::Fajr, 0).await?;
    assert_eq!(h.service.current_times().unwrap().prayer(PrayerName::Fajr).time, fajr);
    Ok(())
}

#[tokio::test]
async fn test_adjustment_out_of_range_is_rejected() -> Result<()> {
    let h = sample().await;
    h.service.fetch_prayer_times(None, false).await?;
    h.service.update_prayer_adjustment(PrayerName::Isha, 30).await?;

    let err = h.service.update_prayer_adjustment(PrayerName::Isha, 31).await.unwrap_err();
    assert_eq!(err, PrayerError::InvalidAdjustment { minutes: 31 });
    assert!(h.service.apply_all_adjustments(-31).await.is_err());
    assert_eq!(h.service.settings().adjustment(PrayerName::Isha), 30);
    Ok(())
}

#[tokio::test]
async fn test_extreme_adjustments_are_rejected() -> Result<()> {
    let h = sample().await;
    let before = h.service.fetch_prayer_times(None, false).await?;

    for minutes in [i32::MIN, i32::MAX] {
        let err = h.service.update_prayer_adjustment(PrayerName::Fajr, minutes).await.unwrap_err();
        assert_eq!(err, PrayerError::InvalidAdjustment { minutes });
        assert!(h.service.apply_all_adjustments(minutes).await.is_err());
    }
    assert_eq!(h.service.settings().adjustment(PrayerName::Fajr), 0);
    assert_eq!(h.service.current_times().unwrap(), before);
    Ok(())
}

#[tokio::test]
async fn test_adjustment_during_fetch_is_displayed() -> Result<()> {
    let h = production().await;
    let service = Arc::new(h.service);
    h.fetcher.hold();

    let pending = tokio::spawn({
        let service = service.clone();
        async move { service.fetch_prayer_times(None, false).await }
    });
    while h.fetcher.calls() < 1 {
        tokio::task::yield_now().await;
    }
    service.update_prayer_adjustment(PrayerName::Fajr, 10).await?;
    h.fetcher.release(10);

    let day = pending.await??;
    let fajr = day.prayer(PrayerName::Fajr);
    assert_eq!(fajr.adjustment, 10);
    assert_eq!(fajr.time, adjust_time(&fajr.original_time, 10));
    assert_eq!(service.current_times().unwrap(), day);

    // the per-day cache holds the adjusted day too
    let cached = service.fetch_prayer_times(None, false).await?;
    assert_eq!(cached.prayer(PrayerName::Fajr).adjustment, 10);
    assert_eq!(h.fetcher.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_adjustment_carries_to_other_days() -> Result<()> {
    let h = sample().await;
    h.service.fetch_prayer_times(None, false).await?;
    h.service.update_prayer_adjustment(PrayerName::Maghrib, -7).await?;
    assert!(h.service.navigate_to_date(d(2025, 6, 2)).await);
    let maghrib = h.service.current_times().unwrap().prayer(PrayerName::Maghrib).clone();
    assert_eq!(maghrib.adjustment, -7);
    assert_eq!(maghrib.time, adjust_time(&maghrib.original_time, -7));
    Ok(())
}

#[tokio::test]
async fn test_settings_are_persisted_and_reloaded() -> Result<()> {
    let h = sample().await;
    h.service.update_prayer_adjustment(PrayerName::Asr, 4).await?;
    h.service.update_time_format(TimeFormat::H12).await;

    let stored = h.store.snapshot("prayer_settings").unwrap();
    assert_eq!(stored["time_adjustments"]["asr"], json!(4));
    assert_eq!(stored["time_format"], json!("12h"));

    let reloaded = PrayerTimesService::builder().store(h.store.clone()).build().await?;
    assert_eq!(reloaded.settings().adjustment(PrayerName::Asr), 4);
    assert_eq!(reloaded.format_time("13:05"), "1:05 PM");
    Ok(())
}

#[tokio::test]
async fn test_update_settings_keeps_guarded_fields() {
    let h = sample().await;
    h.service.update_prayer_adjustment(PrayerName::Fajr, 2).await.unwrap();
    h.service
        .update_settings(|s| {
            s.enable_vibration = false;
            s.time_adjustments.clear();
        })
        .await;
    let settings = h.service.settings();
    assert!(!settings.enable_vibration);
    assert_eq!(settings.adjustment(PrayerName::Fajr), 2);
}

#[tokio::test]
async fn test_update_settings_closure_may_read_service() {
    let h = sample().await;
    h.service
        .update_settings(|s| s.volume = h.service.settings().volume / 2.0)
        .await;
    assert_eq!(h.service.settings().volume, 0.5);
}

#[tokio::test]
async fn test_persistence_failure_is_swallowed() -> Result<()> {
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let service = PrayerTimesService::builder()
        .store(Arc::new(ReadOnlyStore))
        .telemetry(Arc::new(move |e: &PrayerError| {
            assert_eq!(e.kind(), ErrorKind::Persistence);
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .build()
        .await?;

    service.update_prayer_adjustment(PrayerName::Dhuhr, 5).await?;
    assert_eq!(service.settings().adjustment(PrayerName::Dhuhr), 5);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_location_change_clears_and_refetches() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    assert_eq!(h.fetcher.calls(), 1);

    let cairo = Location::new("Cairo", "Egypt");
    h.service.update_location(Some(cairo.clone())).await?;
    assert_eq!(h.fetcher.calls(), 2);
    assert_eq!(h.fetcher.last_request().unwrap().0, cairo);
    assert_eq!(h.service.current_times().unwrap().location, cairo);
    assert_eq!(h.notifier.cancels(), 1);

    // earlier Mecca days are gone from both caches
    assert!(h.service.navigate_to_date(d(2026, 10, 20)).await);
    assert_eq!(h.service.current_times().unwrap().location, cairo);
    Ok(())
}

#[tokio::test]
async fn test_device_location() -> Result<()> {
    let istanbul = GeoFix {
        latitude: 41.0082,
        longitude: 28.9784,
        city: "Istanbul".into(),
        country: "Turkey".into(),
    };
    let service = PrayerTimesService::builder()
        .locator(Arc::new(FixedLocator(istanbul)))
        .build()
        .await?;
    service.update_location(None).await?;
    assert_eq!(service.settings().location.mode, LocationMode::Auto);
    assert_eq!(service.current_times().unwrap().location.city, "Istanbul");
    Ok(())
}

#[tokio::test]
async fn test_device_location_unavailable_keeps_settings() {
    let h = sample().await;
    let before = h.service.settings();
    let err = h.service.update_location(None).await.unwrap_err();
    assert!(matches!(err, PrayerError::Location(_)));
    assert_eq!(h.service.settings(), before);
}

#[tokio::test]
async fn test_method_change_refetches() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    let isna = CalculationMethod::by_id(2).unwrap();
    h.service.update_calculation_method(isna.clone()).await?;
    assert_eq!(h.fetcher.calls(), 2);
    assert_eq!(h.fetcher.last_request().unwrap().1, 2);
    assert_eq!(h.service.current_times().unwrap().method, isna);
    Ok(())
}

// ── Notifications and upcoming prayer ────────────────────────────────

#[tokio::test]
async fn test_notifications_only_for_real_today() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    assert_eq!(h.notifier.scheduled(), vec![today()]);

    assert!(h.service.navigate_to_date(d(2026, 10, 20)).await);
    assert_eq!(h.notifier.scheduled().len(), 1);

    assert!(!h.service.toggle_prayer_notification(PrayerName::Fajr).await);
    assert_eq!(h.notifier.scheduled(), vec![today(), today()]);
    let fajr = h.service.current_times().unwrap().prayer(PrayerName::Fajr).clone();
    assert!(!fajr.notification_enabled);
    Ok(())
}

#[tokio::test]
async fn test_next_prayer_only_on_initial_date() -> Result<()> {
    let h = production().await;
    h.service.fetch_prayer_times(None, false).await?;
    let next = h.service.get_next_prayer().unwrap();
    assert_eq!(next.name, PrayerName::Dhuhr);
    assert!(!next.is_tomorrow);
    assert_eq!(h.service.get_current_prayer(), Some(PrayerName::Fajr));

    assert!(h.service.navigate_to_date(d(2026, 10, 20)).await);
    assert_eq!(h.service.get_next_prayer(), None);
    assert_eq!(h.service.tick(), None);

    assert!(h.service.navigate_to_date(today()).await);
    assert!(h.service.get_next_prayer().is_some());

    h.clock.set(at(today(), 23, 30));
    let next = h.service.tick().unwrap();
    assert_eq!(next.name, PrayerName::Fajr);
    assert!(next.is_tomorrow);
    Ok(())
}
