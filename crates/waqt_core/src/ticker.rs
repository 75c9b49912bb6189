use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::service::PrayerTimesService;

/// Keeps the periodic tick alive. Dropping it stops the timer.
#[derive(Debug)]
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl PrayerTimesService {
    /// Drives [`PrayerTimesService::tick`] every `tick_interval` on the current
    /// tokio runtime. The task ends on its own once the service is dropped.
    pub fn spawn_ticker(self: &Arc<Self>) -> TickerHandle {
        let weak = Arc::downgrade(self);
        let period = self.config().tick_interval();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(service) = weak.upgrade() else {
                    debug!("Service dropped, stopping ticker");
                    break;
                };
                service.tick();
            }
        });
        TickerHandle { handle }
    }
}
