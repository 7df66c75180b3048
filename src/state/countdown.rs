//! Countdown state machine
//!
//! [`Countdown`] holds the timing fields of a meditation timer and applies the
//! start/stop/reset/tick transitions. It never reads a clock or schedules
//! anything: every transition that needs the current time takes it as an
//! argument, which keeps the state machine deterministic and lets
//! [`TimerEngine`](crate::engine::TimerEngine) own the clock and the ticker.

use std::time::Duration;

use chrono::{DateTime, Utc};
use super::snapshot::TimerSnapshot;

/// Interval used when restored state carries none
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// The four observable states of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Stopped with the full interval remaining
    Fresh,
    /// Stopped somewhere between the full interval and zero
    Partial,
    /// Counting down
    Running,
    /// Reached zero; terminal until reset
    Elapsed,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Remaining time after the tick
    pub remaining: Duration,
    /// Whether this tick took the countdown to zero
    pub elapsed: bool,
}

/// Countdown timing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    interval: Duration,
    adjusted_interval: Duration,
    remaining: Duration,
    started_at: Option<DateTime<Utc>>,
}

impl Countdown {
    /// Create a stopped countdown with the full interval remaining.
    ///
    /// The caller guarantees `interval` is non-zero.
    pub fn new(interval: Duration) -> Self {
        debug_assert!(!interval.is_zero());
        Self {
            interval,
            adjusted_interval: interval,
            remaining: interval,
            started_at: None,
        }
    }

    /// Rebuild a stopped countdown from persisted fields.
    ///
    /// Missing or out-of-range fields fall back instead of failing: a missing
    /// or zero interval becomes [`DEFAULT_INTERVAL`], missing adjusted and
    /// remaining values become the interval, and values above the interval are
    /// clamped to it. Because a stopped countdown resumes from its adjusted
    /// interval, both are then aligned to the smaller of the two.
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        let interval = snapshot
            .interval_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INTERVAL);
        let adjusted = snapshot
            .adjusted_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(interval)
            .min(interval);
        let remaining = snapshot
            .remaining_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(interval)
            .min(interval);
        let resume_point = adjusted.min(remaining);

        Self {
            interval,
            adjusted_interval: resume_point,
            remaining: resume_point,
            started_at: None,
        }
    }

    /// Capture the persistable fields. The running flag is not included.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            interval_ms: Some(duration_millis(self.interval)),
            adjusted_interval_ms: Some(duration_millis(self.adjusted_interval)),
            remaining_interval_ms: Some(duration_millis(self.remaining)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn adjusted_interval(&self) -> Duration {
        self.adjusted_interval
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining.is_zero()
    }

    pub fn phase(&self) -> Phase {
        if self.is_running() {
            Phase::Running
        } else if self.is_elapsed() {
            Phase::Elapsed
        } else if self.remaining == self.interval {
            Phase::Fresh
        } else {
            Phase::Partial
        }
    }

    /// Begin counting down from the adjusted interval.
    ///
    /// Returns `false` without changing anything when already running or
    /// elapsed.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() || self.is_elapsed() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Freeze the countdown at its last computed remaining time.
    ///
    /// Returns `false` when not running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.adjusted_interval = self.remaining;
        self.started_at = None;
        true
    }

    /// Return to the configured interval. Refused while running.
    pub fn reset(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.adjusted_interval = self.interval;
        self.remaining = self.interval;
        true
    }

    /// Replace the configured interval. Any run in progress is discarded.
    ///
    /// The caller guarantees `interval` is non-zero.
    pub fn set_interval(&mut self, interval: Duration) {
        *self = Self::new(interval);
    }

    /// Recompute the remaining time from the start timestamp.
    ///
    /// The result never increases between ticks of the same run, even if the
    /// wall clock steps backwards. Reaching zero stops the countdown. Ticking
    /// a stopped countdown reports its frozen state.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        let Some(started_at) = self.started_at else {
            return Tick {
                remaining: self.remaining,
                elapsed: false,
            };
        };

        let since_start = (now - started_at).to_std().unwrap_or(Duration::ZERO);
        let remaining = self.adjusted_interval.saturating_sub(since_start);
        self.remaining = self.remaining.min(remaining);

        let elapsed = self.is_elapsed();
        if elapsed {
            self.stop();
        }

        Tick {
            remaining: self.remaining,
            elapsed,
        }
    }
}

/// Milliseconds in a duration, saturating at `u64::MAX`
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
