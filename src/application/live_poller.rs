// Live poller - periodically reveals the next sample
use crate::application::power_service::PowerService;
use crate::domain::error::PowerError;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct LivePoller {
    service: PowerService,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LivePoller {
    pub fn new(service: PowerService) -> Self {
        Self {
            service,
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start revealing one sample per `interval`. Returns `false` without
    /// doing anything when a poll task is already running or the interval is zero.
    pub fn start(&self, interval: Duration) -> bool {
        if interval.is_zero() {
            tracing::warn!("Refusing to start live polling with a zero interval");
            return false;
        }

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        tracing::info!("Starting live polling every {:?}", interval);
        let service = self.service.clone();
        *task = Some(tokio::spawn(poll(service, interval)));
        true
    }

    /// Stop polling. Once this returns no further sample will be appended by
    /// the poller. Returns `false` when nothing was running.
    pub async fn cancel(&self) -> bool {
        let handle = {
            let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
            task.take()
        };
        let Some(handle) = handle else {
            return false;
        };

        let was_running = !handle.is_finished();
        handle.abort();
        // Appends happen between await points, so the task is fully stopped
        // once the join resolves.
        let _ = handle.await;
        if was_running {
            tracing::info!("Live polling cancelled");
        }
        was_running
    }
}

async fn poll(service: PowerService, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    // The first tick completes immediately; the first reveal waits a full interval.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match service.advance_and_reveal() {
            Ok(sample) => {
                tracing::debug!("Revealed sample at {}", sample.time_ms);
            }
            Err(PowerError::PlaybackExhausted) => {
                tracing::warn!("Recording exhausted, stopping live polling");
                break;
            }
            Err(e) => {
                tracing::warn!("Failed to reveal next sample: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::power_service::tests::{recording, settings};
    use crate::application::sample_store::SampleStore;

    fn service(cursor: usize) -> PowerService {
        let store = SampleStore::seeded(recording(), cursor).unwrap();
        PowerService::new(store, &settings(240))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let service = service(10);
        let poller = LivePoller::new(service.clone());

        assert!(poller.start(Duration::from_millis(100)));
        assert!(!poller.start(Duration::from_millis(100)));
        assert!(poller.is_running());

        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(service.window().len(), 15);

        assert!(poller.cancel().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_appends() {
        let service = service(10);
        let poller = LivePoller::new(service.clone());

        poller.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(poller.cancel().await);
        let len = service.window().len();
        assert_eq!(len, 12);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(service.window().len(), len);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_refused() {
        let service = service(10);
        let poller = LivePoller::new(service.clone());

        assert!(!poller.start(Duration::ZERO));
        assert!(!poller.is_running());
        assert!(!poller.cancel().await);

        // a valid interval still starts afterwards
        assert!(poller.start(Duration::from_millis(100)));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(service.window().len(), 11);
        assert!(poller.cancel().await);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let poller = LivePoller::new(service(10));
        assert!(!poller.cancel().await);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_recording_exhausted() {
        let service = service(118);
        let poller = LivePoller::new(service.clone());

        poller.start(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(service.pending(), 0);
        assert!(!poller.is_running());

        // a finished task can be replaced
        assert!(poller.start(Duration::from_millis(10)));
        poller.cancel().await;
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_cancel() {
        let service = service(10);
        let poller = LivePoller::new(service.clone());

        poller.start(Duration::from_millis(100));
        poller.cancel().await;
        assert!(poller.start(Duration::from_millis(100)));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(service.window().len(), 11);
        poller.cancel().await;
    }
}
