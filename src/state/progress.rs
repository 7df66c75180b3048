//! Progress view model rendered by the host

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    engine::{TimerEngine, TimerListener},
    state::countdown::duration_millis,
    utils::format_clock,
};

/// Coarse timer status shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Running,
    Elapsed,
    Idle,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Elapsed => "elapsed",
            Self::Idle => "idle",
        }
    }

    /// Instruction shown under the progress ring
    pub fn message(&self) -> &'static str {
        match self {
            Self::Running => "Press to stop",
            Self::Elapsed => "Press to reset",
            Self::Idle => "Press to start",
        }
    }
}

/// Everything needed to draw the timer screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub status: TimerStatus,
    pub interval_ms: u64,
    pub remaining_ms: u64,
    /// Completed fraction in `0.0..=1.0`
    pub percentage: f64,
    /// Remaining time as `MM:SS`
    pub display: String,
    pub message: String,
}

impl Progress {
    pub fn new(status: TimerStatus, interval: Duration, remaining: Duration) -> Self {
        let interval_ms = duration_millis(interval);
        let remaining_ms = duration_millis(remaining).min(interval_ms);
        let percentage = if interval_ms == 0 {
            0.0
        } else {
            (interval_ms - remaining_ms) as f64 / interval_ms as f64
        };

        Self {
            status,
            interval_ms,
            remaining_ms,
            percentage,
            display: format_clock(remaining),
            message: status.message().to_string(),
        }
    }

    /// Read the current state straight from the engine
    pub fn from_engine(engine: &TimerEngine) -> Self {
        let status = if engine.is_running() {
            TimerStatus::Running
        } else if engine.is_elapsed() {
            TimerStatus::Elapsed
        } else {
            TimerStatus::Idle
        };
        Self::new(status, engine.interval(), engine.remaining())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Keeps a [`Progress`] channel current from tick and elapsed events.
///
/// Only consumes the values carried by the events; the configured interval is
/// taken from the last published progress, which the host refreshes whenever
/// it reconfigures the timer.
pub struct ProgressListener {
    tx: watch::Sender<Progress>,
}

impl ProgressListener {
    pub fn new(tx: watch::Sender<Progress>) -> Arc<Self> {
        Arc::new(Self { tx })
    }
}

impl TimerListener for ProgressListener {
    fn on_tick(&self, remaining: Duration) {
        self.tx.send_modify(|progress| {
            *progress = Progress::new(TimerStatus::Running, progress.interval(), remaining);
        });
    }

    fn on_elapsed(&self) {
        self.tx.send_modify(|progress| {
            *progress = Progress::new(TimerStatus::Elapsed, progress.interval(), Duration::ZERO);
        });
    }
}
