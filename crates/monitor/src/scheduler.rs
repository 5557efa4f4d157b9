//! Rescan Scheduler - adaptive backoff for mutation storms
//!
//! Some pages mutate constantly (editors, tickers, ad rotators). Rescanning
//! on every batch would keep the thread busy, so rescans are rate limited:
//!
//! ```text
//! event outside the pause window  ─→ run now, remember the time
//! event inside the window         ─→ grow pause ×1.5, run once after it
//! more events while one is queued ─→ coalesced
//! after the queued run            ─→ pause decays back to the minimum
//! ```
//!
//! Time comes from `tokio::time`, so tests can drive it with a paused clock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::SchedulerConfig;
use crate::events::{EventBus, MonitorEvent};

/// What [`RescanScheduler::run`] did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ignored,
    Immediate,
    Deferred,
    Coalesced,
}

#[derive(Debug)]
struct PauseState {
    pause_ms: u64,
    last_event: Instant,
    pending: bool,
    deferred_task: Option<JoinHandle<()>>,
    decay_task: Option<JoinHandle<()>>,
}

struct Inner {
    config: SchedulerConfig,
    state: Mutex<PauseState>,
    bus: EventBus,
}

/// One per document. Cloning shares the state.
#[derive(Clone)]
pub struct RescanScheduler {
    inner: Arc<Inner>,
}

impl RescanScheduler {
    pub fn new(bus: EventBus) -> Self {
        Self::with_config(SchedulerConfig::default(), bus)
    }

    pub fn with_config(config: SchedulerConfig, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(PauseState {
                    pause_ms: config.min_pause_ms,
                    last_event: Instant::now(),
                    pending: false,
                    deferred_task: None,
                    decay_task: None,
                }),
                config,
                bus,
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Gate one event
    ///
    /// `immediate` runs inline when the pause window has passed. Otherwise
    /// `deferred` is queued to run once the (grown) pause elapses, unless a
    /// deferred run is already queued.
    pub async fn run<S, I, IFut, D, DFut>(
        &self,
        should_ignore: S,
        immediate: I,
        deferred: D,
    ) -> RunOutcome
    where
        S: FnOnce() -> bool,
        I: FnOnce() -> IFut,
        IFut: Future<Output = ()>,
        D: FnOnce() -> DFut + Send + 'static,
        DFut: Future<Output = ()> + Send + 'static,
    {
        if should_ignore() {
            return RunOutcome::Ignored;
        }

        let now = Instant::now();
        let mut state = self.inner.state.lock().await;

        if now > state.last_event + Duration::from_millis(state.pause_ms) {
            state.last_event = now;
            drop(state);
            immediate().await;
            return RunOutcome::Immediate;
        }

        if state.pending {
            tracing::trace!("[RescanScheduler] Coalesced into pending rescan");
            return RunOutcome::Coalesced;
        }

        self.inner.grow(&mut state);
        let delay = Duration::from_millis(state.pause_ms);
        state.pending = true;

        let inner = self.inner.clone();
        state.deferred_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deferred().await;

            let mut state = inner.state.lock().await;
            state.pending = false;
            state.deferred_task = None;
            Inner::start_decay(&inner, &mut state);
        }));

        tracing::debug!("[RescanScheduler] Deferred rescan in {:?}", delay);
        RunOutcome::Deferred
    }

    /// Current pause
    pub async fn pause(&self) -> Duration {
        Duration::from_millis(self.inner.state.lock().await.pause_ms)
    }

    /// Has backoff kicked in? Results may then be out of date.
    pub async fn is_paused(&self) -> bool {
        self.inner.state.lock().await.pause_ms > self.inner.config.min_pause_ms
    }

    /// Is a deferred rescan queued?
    pub async fn has_pending(&self) -> bool {
        self.inner.state.lock().await.pending
    }

    /// Cancel queued work and go back to the minimum pause. Idempotent.
    pub async fn reset(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.deferred_task.take() {
            task.abort();
        }
        if let Some(task) = state.decay_task.take() {
            task.abort();
        }
        state.pending = false;
        if state.pause_ms != self.inner.config.min_pause_ms {
            state.pause_ms = self.inner.config.min_pause_ms;
            self.inner.publish_pause(state.pause_ms);
        }
        tracing::debug!("[RescanScheduler] Reset");
    }
}

impl Inner {
    fn grow(&self, state: &mut PauseState) {
        if let Some(task) = state.decay_task.take() {
            task.abort();
        }
        let grown = (state.pause_ms as f64 * self.config.growth_multiplier).floor() as u64;
        state.pause_ms = grown.min(self.config.max_pause_ms);
        self.publish_pause(state.pause_ms);
    }

    fn start_decay(inner: &Arc<Inner>, state: &mut PauseState) {
        if let Some(task) = state.decay_task.take() {
            task.abort();
        }
        if state.pause_ms <= inner.config.min_pause_ms {
            return;
        }

        let this = inner.clone();
        state.decay_task = Some(tokio::spawn(async move {
            let interval = this.config.decay_interval();
            loop {
                tokio::time::sleep(interval).await;

                let mut state = this.state.lock().await;
                let min = this.config.min_pause_ms;
                state.pause_ms = state
                    .pause_ms
                    .saturating_sub(this.config.decay_step_ms)
                    .max(min);
                this.publish_pause(state.pause_ms);
                tracing::trace!("[RescanScheduler] Pause decayed to {}ms", state.pause_ms);

                if state.pause_ms <= min {
                    state.decay_task = None;
                    break;
                }
            }
        }));
    }

    fn publish_pause(&self, pause_ms: u64) {
        self.bus.publish(MonitorEvent::PauseChanged { pause_ms });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    async fn fire(
        scheduler: &RescanScheduler,
        immediate: &Arc<AtomicUsize>,
        deferred: &Arc<AtomicUsize>,
    ) -> RunOutcome {
        let immediate = immediate.clone();
        let deferred = deferred.clone();
        scheduler
            .run(
                || false,
                || async move {
                    immediate.fetch_add(1, Ordering::SeqCst);
                },
                move || async move {
                    deferred.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_backpressure() {
        let scheduler = RescanScheduler::new(EventBus::new());
        let (immediate, deferred) = counter();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Immediate);
        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Deferred);
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Coalesced);
        }

        assert!(scheduler.pause().await >= Duration::from_millis(750));
        assert!(scheduler.is_paused().await);
        assert_eq!(deferred.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(immediate.load(Ordering::SeqCst), 1);
        assert_eq!(deferred.load(Ordering::SeqCst), 1);
        assert!(!scheduler.has_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_event_after_creation_is_deferred() {
        let scheduler = RescanScheduler::new(EventBus::new());
        let (immediate, deferred) = counter();

        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Deferred);
        assert_eq!(scheduler.pause().await, Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_storm_grows_then_decays_to_minimum() {
        let scheduler = RescanScheduler::new(EventBus::new());
        let (immediate, deferred) = counter();
        tokio::time::sleep(Duration::from_millis(600)).await;

        // Steady 10ms drizzle for three seconds
        let mut peak = Duration::ZERO;
        for _ in 0..300 {
            fire(&scheduler, &immediate, &deferred).await;
            peak = peak.max(scheduler.pause().await);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(peak > Duration::from_millis(750));
        assert!(peak <= Duration::from_millis(60_000));

        // Let the last deferred run fire and the decay finish
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(scheduler.pause().await, Duration::from_millis(500));
        assert!(!scheduler.is_paused().await);
        assert!(deferred.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decay_steps() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let scheduler = RescanScheduler::new(bus);
        let (immediate, deferred) = counter();

        // Inside the window right after creation: pause 500 → 750
        fire(&scheduler, &immediate, &deferred).await;
        tokio::time::sleep(Duration::from_millis(751)).await;
        assert_eq!(deferred.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pause().await, Duration::from_millis(750));

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(scheduler.pause().await, Duration::from_millis(500));

        let mut pauses = Vec::new();
        while let Ok(MonitorEvent::PauseChanged { pause_ms }) = rx.try_recv() {
            pauses.push(pause_ms);
        }
        assert_eq!(pauses, vec![750, 500]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_is_capped() {
        let config = SchedulerConfig {
            max_pause_ms: 800,
            ..Default::default()
        };
        let scheduler = RescanScheduler::with_config(config, EventBus::new());
        let (immediate, deferred) = counter();

        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Deferred);
        assert_eq!(scheduler.pause().await, Duration::from_millis(750));

        tokio::time::sleep(Duration::from_millis(760)).await;
        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Immediate);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Deferred);
        assert_eq!(scheduler.pause().await, Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_work() {
        let scheduler = RescanScheduler::new(EventBus::new());
        let (immediate, deferred) = counter();

        assert_eq!(fire(&scheduler, &immediate, &deferred).await, RunOutcome::Deferred);
        scheduler.reset().await;
        scheduler.reset().await;

        assert_eq!(scheduler.pause().await, Duration::from_millis(500));
        assert!(!scheduler.has_pending().await);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(deferred.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_events_do_nothing() {
        let scheduler = RescanScheduler::new(EventBus::new());
        let outcome = scheduler.run(|| true, || async {}, || async {}).await;
        assert_eq!(outcome, RunOutcome::Ignored);
        assert_eq!(scheduler.pause().await, Duration::from_millis(500));
    }
}
