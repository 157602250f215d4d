use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled,
}

/// Owns at most one recurring refresh timer. `start` always cancels any
/// armed timer first, so two concurrent timers cannot exist for one
/// scheduler instance; `stop` is idempotent from any state.
///
/// The tick callback is invoked once per period and must not assume the
/// previous tick's work has completed; overlapping fetches settle in
/// completion order at the consumer.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn start<F>(&mut self, interval_ms: i64, eligible: bool, on_tick: F)
    where
        F: Fn() + Send + 'static,
    {
        self.stop();
        if !eligible || interval_ms <= 0 {
            debug!(event = "refresh_timer_idle", interval_ms, eligible);
            return;
        }
        let period = Duration::from_millis(interval_ms as u64);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick of a tokio interval completes immediately; the
            // arming refresh already ran, so the cadence starts one period out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                on_tick();
            }
        });
        debug!(event = "refresh_timer_armed", interval_ms);
        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(event = "refresh_timer_stopped");
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.handle.is_some() {
            SchedulerState::Scheduled
        } else {
            SchedulerState::Idle
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.state() == SchedulerState::Scheduled
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick(ticks: &Arc<AtomicUsize>) -> impl Fn() + Send + 'static {
        let ticks = Arc::clone(ticks);
        move || {
            ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_the_configured_cadence() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(100, true, counting_tick(&ticks));
        assert!(scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 10);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_never_arms_two_timers() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(100, true, counting_tick(&ticks));
        scheduler.start(100, true, counting_tick(&ticks));

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 10);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn ineligible_views_never_arm_a_timer() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(100, false, counting_tick(&ticks));
        assert!(!scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_and_zero_intervals_stay_idle() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(-1, true, counting_tick(&ticks));
        assert!(!scheduler.is_scheduled());
        scheduler.start(0, true, counting_tick(&ticks));
        assert!(!scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_with_ineligible_window_cancels_the_armed_timer() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(100, true, counting_tick(&ticks));
        scheduler.start(100, false, counting_tick(&ticks));
        assert!(!scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.stop();
        assert!(!scheduler.is_scheduled());

        scheduler.start(100, true, counting_tick(&ticks));
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
