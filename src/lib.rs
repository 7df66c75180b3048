//! Enhance Your Calm - A meditation countdown timer
//! 
//! The core of this library is [`TimerEngine`], a pausable countdown that
//! computes remaining time from wall-clock deltas, notifies listeners on a
//! fixed cadence and fires a single elapsed event per completed run. Around it
//! sits a small host: progress rendering, state persistence across restarts,
//! an alarm command and an HTTP control surface.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{Clock, ManualClock, SystemClock, TimerEngine, TimerListener};
pub use error::{PersistenceError, TimerError};
pub use state::{AppState, InstanceState, Progress, TimerSnapshot};
pub use utils::signals::shutdown_signal;
