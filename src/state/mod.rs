//! State management module
//! 
//! This module contains the countdown state machine, its persistable form,
//! the rendered progress and the host controller that ties them together.

pub mod app_state;
pub mod countdown;
pub mod progress;
pub mod snapshot;

// Re-export main types
pub use app_state::{initial_interval, AppState, INTERVAL_PRESETS_MINUTES};
pub use countdown::{Countdown, Phase, Tick, DEFAULT_INTERVAL};
pub use progress::{Progress, ProgressListener, TimerStatus};
pub use snapshot::{InstanceState, TimerSnapshot};
