//! Meditation timer engine
//!
//! [`TimerEngine`] wraps a [`Countdown`] with a wall clock, a periodic ticker
//! task and a set of [`TimerListener`]s. Remaining time is always recomputed
//! from the absolute start timestamp, so the ticker may fire late, skip beats
//! or be suspended with the process without corrupting the countdown.
//!
//! Every transition that changes the running state cancels the ticker and
//! bumps a run generation under the engine lock. A tick that was already in
//! flight sees the stale generation and exits without touching state, so a
//! stopped timer can never be revived by its own ticker.
//!
//! A tick holds the re-entrant notification guard from computing the new
//! remaining time until its last listener returns, and every transition takes
//! the same guard first. A `stop()` from another thread therefore waits for an
//! in-flight notification instead of being overtaken by it, while a listener
//! may still stop or reset the timer from inside its own callback.

pub mod clock;
pub mod listener;

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    error::TimerError,
    state::{
        countdown::{duration_millis, Countdown},
        TimerSnapshot,
    },
    tasks::spawn_ticker,
};

pub use crate::state::countdown::{Phase, DEFAULT_INTERVAL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use listener::{ListenerSet, TimerListener};

/// Delay between ticks while running
pub const TICK_CADENCE: Duration = Duration::from_millis(200);

/// Convert a signed millisecond count into a valid interval
pub fn interval_from_millis(millis: i64) -> Result<Duration, TimerError> {
    u64::try_from(millis)
        .ok()
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
        .ok_or(TimerError::NonPositiveInterval(millis))
}

fn validate_interval(interval: Duration) -> Result<(), TimerError> {
    if interval.is_zero() {
        Err(TimerError::NonPositiveInterval(0))
    } else {
        Ok(())
    }
}

/// State shared between engine handles and the ticker task
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    /// Held across a tick's compute and notify, and by every transition.
    /// Always taken before `inner`.
    notify: ReentrantMutex<()>,
    clock: Arc<dyn Clock>,
}

struct Inner {
    countdown: Countdown,
    listeners: ListenerSet,
    run: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Inner {
    /// Invalidate the current run and abort its ticker
    fn cancel_ticker(&mut self) {
        self.run = self.run.wrapping_add(1);
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Listeners never run under this lock
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify_guard(&self) -> ReentrantMutexGuard<'_, ()> {
        self.notify.lock()
    }

    /// Run one tick for the given run generation.
    ///
    /// Returns whether the ticker should keep going.
    pub(crate) fn tick(&self, run: u64) -> bool {
        let _notifying = self.notify_guard();
        let (tick, listeners) = {
            let mut inner = self.lock();
            if inner.run != run || !inner.countdown.is_running() {
                return false;
            }

            let tick = inner.countdown.tick(self.clock.now());
            if tick.elapsed {
                // The ticker exits on its own once this returns false
                inner.run = inner.run.wrapping_add(1);
                inner.ticker = None;
            }
            (tick, inner.listeners.snapshot())
        };

        debug!("Timer tick: {}ms remaining", duration_millis(tick.remaining));
        for listener in &listeners {
            listener.on_tick(tick.remaining);
        }

        if tick.elapsed {
            info!("Timer elapsed");
            for listener in &listeners {
                listener.on_elapsed();
            }
        }

        !tick.elapsed
    }
}

/// Countdown timer with pause/resume, periodic tick notifications and a
/// single elapsed notification per completed run.
///
/// Handles are cheap to clone and share the same timer. `start` spawns the
/// ticker on the current Tokio runtime and therefore must be called from
/// within one.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Shared>,
}

impl TimerEngine {
    /// Create a stopped timer using the system clock
    pub fn new(interval: Duration) -> Result<Self, TimerError> {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    /// Create a stopped timer reading time from `clock`
    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Result<Self, TimerError> {
        validate_interval(interval)?;
        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    countdown: Countdown::new(interval),
                    listeners: ListenerSet::new(),
                    run: 0,
                    ticker: None,
                }),
                notify: ReentrantMutex::new(()),
                clock,
            }),
        })
    }

    /// Stop the timer and replace its interval.
    ///
    /// A zero interval is rejected and leaves the timer untouched. No tick is
    /// emitted; callers re-render from the accessors.
    pub fn set_interval(&self, interval: Duration) -> Result<(), TimerError> {
        validate_interval(interval)?;

        let _notifying = self.shared.notify_guard();
        let mut inner = self.shared.lock();
        inner.cancel_ticker();
        inner.countdown.set_interval(interval);
        info!("Timer interval set to {}ms", duration_millis(interval));
        Ok(())
    }

    /// Start counting down. No-op when running or elapsed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) {
        let _notifying = self.shared.notify_guard();
        let mut inner = self.shared.lock();
        if !inner.countdown.start(self.shared.clock.now()) {
            debug!("Timer start ignored in phase {:?}", inner.countdown.phase());
            return;
        }

        inner.cancel_ticker();
        let run = inner.run;
        inner.ticker = Some(spawn_ticker(Arc::downgrade(&self.shared), run, TICK_CADENCE));
        info!(
            "Timer started with {}ms remaining",
            duration_millis(inner.countdown.remaining())
        );
    }

    /// Pause the countdown, keeping the remaining time as the resume point.
    /// No-op when not running.
    pub fn stop(&self) {
        let _notifying = self.shared.notify_guard();
        let mut inner = self.shared.lock();
        if !inner.countdown.is_running() {
            return;
        }

        inner.cancel_ticker();
        inner.countdown.stop();
        info!(
            "Timer stopped with {}ms remaining",
            duration_millis(inner.countdown.remaining())
        );
    }

    /// Return to the configured interval. No-op while running; stop first.
    pub fn reset(&self) {
        let _notifying = self.shared.notify_guard();
        let mut inner = self.shared.lock();
        if inner.countdown.is_running() {
            debug!("Timer reset ignored while running");
            return;
        }

        inner.cancel_ticker();
        inner.countdown.reset();
        info!("Timer reset");
    }

    pub fn interval(&self) -> Duration {
        self.shared.lock().countdown.interval()
    }

    pub fn remaining(&self) -> Duration {
        self.shared.lock().countdown.remaining()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().countdown.is_running()
    }

    pub fn is_elapsed(&self) -> bool {
        self.shared.lock().countdown.is_elapsed()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().countdown.phase()
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Arc<dyn TimerListener>) -> bool {
        self.shared.lock().listeners.add(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn TimerListener>) -> bool {
        self.shared.lock().listeners.remove(listener)
    }

    /// Persistable fields; the running flag is not included
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.lock().countdown.snapshot()
    }

    /// Replace the timer state from a snapshot, leaving the timer stopped.
    ///
    /// Never fails: missing or out-of-range fields fall back to defaults.
    pub fn restore(&self, snapshot: &TimerSnapshot) {
        let _notifying = self.shared.notify_guard();
        let mut inner = self.shared.lock();
        inner.cancel_ticker();
        inner.countdown = Countdown::from_snapshot(snapshot);
        info!(
            "Timer restored: interval {}ms, remaining {}ms",
            duration_millis(inner.countdown.interval()),
            duration_millis(inner.countdown.remaining())
        );
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("TimerEngine")
            .field("countdown", &inner.countdown)
            .field("listeners", &inner.listeners.len())
            .field("run", &inner.run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_millis() {
        assert_eq!(interval_from_millis(1_500), Ok(Duration::from_millis(1_500)));
        assert_eq!(interval_from_millis(0), Err(TimerError::NonPositiveInterval(0)));
        assert_eq!(interval_from_millis(-5), Err(TimerError::NonPositiveInterval(-5)));
    }

    #[test]
    fn test_new_rejects_zero_interval() {
        assert_eq!(
            TimerEngine::new(Duration::ZERO).unwrap_err(),
            TimerError::NonPositiveInterval(0)
        );
    }

    #[test]
    fn test_new_engine_accessors() {
        let engine = TimerEngine::new(Duration::from_secs(600)).unwrap();
        assert_eq!(engine.interval(), Duration::from_secs(600));
        assert_eq!(engine.remaining(), Duration::from_secs(600));
        assert!(!engine.is_running());
        assert!(!engine.is_elapsed());
        assert_eq!(engine.phase(), Phase::Fresh);
    }

    #[test]
    fn test_set_interval_rejection_keeps_state() {
        let engine = TimerEngine::new(Duration::from_secs(600)).unwrap();
        assert!(engine.set_interval(Duration::ZERO).is_err());
        assert_eq!(engine.interval(), Duration::from_secs(600));
        assert_eq!(engine.remaining(), Duration::from_secs(600));
    }

    #[test]
    fn test_stale_run_does_not_tick() {
        let clock = Arc::new(ManualClock::default());
        let engine = TimerEngine::with_clock(Duration::from_secs(10), clock).unwrap();
        assert!(!engine.shared.tick(0));
        assert!(!engine.shared.tick(1));
    }
}
