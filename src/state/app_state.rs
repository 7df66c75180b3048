//! Host controller for the timer screen

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{InstanceState, Progress, ProgressListener};
use crate::{
    engine::{TimerEngine, TimerListener, DEFAULT_INTERVAL},
    error::{PersistenceError, TimerError},
    services::{AlarmListener, Preferences, StateStore},
    state::countdown::duration_millis,
    utils::format_uptime,
};

/// Interval choices offered by the selection screen, in minutes
pub const INTERVAL_PRESETS_MINUTES: [u64; 6] = [5, 15, 20, 30, 45, 60];

/// Pick the starting interval: command line, then stored preference, then
/// the library default.
pub fn initial_interval(cli_minutes: Option<u64>, preferences: &Preferences) -> Duration {
    cli_minutes
        .filter(|&minutes| minutes > 0)
        .and_then(|minutes| minutes.checked_mul(60))
        .map(Duration::from_secs)
        .or_else(|| preferences.interval_ms.filter(|&ms| ms > 0).map(Duration::from_millis))
        .unwrap_or(DEFAULT_INTERVAL)
}

/// Application state shared by the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// The meditation timer
    pub engine: TimerEngine,
    /// Preference and instance state files
    pub store: StateStore,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel carrying the rendered progress
    pub progress_tx: watch::Sender<Progress>,
    /// Keep the receiver alive to prevent channel closure
    pub _progress_rx: watch::Receiver<Progress>,
}

impl AppState {
    /// Create the host around `engine`, wiring up rendering and the alarm
    pub fn new(
        port: u16,
        host: String,
        engine: TimerEngine,
        store: StateStore,
        alarm_command: Option<String>,
    ) -> Self {
        let (progress_tx, progress_rx) = watch::channel(Progress::from_engine(&engine));

        let progress_listener: Arc<dyn TimerListener> = ProgressListener::new(progress_tx.clone());
        let alarm_listener: Arc<dyn TimerListener> = Arc::new(AlarmListener::new(alarm_command));
        engine.add_listener(progress_listener);
        engine.add_listener(alarm_listener);

        Self {
            engine,
            store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            progress_tx,
            _progress_rx: progress_rx,
        }
    }

    /// Record an action for the status endpoint
    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Publish progress read directly from the engine
    pub fn render(&self) -> Progress {
        let progress = Progress::from_engine(&self.engine);
        self.progress_tx.send_replace(progress.clone());
        progress
    }

    /// Latest published progress
    pub fn progress(&self) -> Progress {
        self.progress_tx.borrow().clone()
    }

    /// Stop a running timer, reset an elapsed one, start anything else
    pub fn toggle(&self) -> Progress {
        if self.engine.is_running() {
            self.stop()
        } else if self.engine.is_elapsed() {
            self.record_action("reset");
            self.engine.reset();
            self.render()
        } else {
            self.start()
        }
    }

    pub fn start(&self) -> Progress {
        self.record_action("start");
        self.engine.start();
        self.render()
    }

    pub fn stop(&self) -> Progress {
        self.record_action("stop");
        self.engine.stop();
        self.render()
    }

    /// Reset a stopped timer. A running timer is left alone.
    pub fn reset(&self) -> Result<Progress, String> {
        if self.engine.is_running() {
            return Err("Timer is running; stop or abandon it first".to_string());
        }
        self.record_action("reset");
        self.engine.reset();
        Ok(self.render())
    }

    /// Stop and reset in one step
    pub fn abandon(&self) -> Progress {
        info!("Abandoning timer");
        self.record_action("abandon");
        self.engine.stop();
        self.engine.reset();
        self.render()
    }

    /// Reconfigure the timer and remember the choice
    pub fn update_interval(&self, interval: Duration) -> Result<Progress, TimerError> {
        self.engine.set_interval(interval)?;
        self.record_action("interval");

        let preferences = Preferences {
            interval_ms: Some(duration_millis(interval)),
        };
        if let Err(e) = self.store.save_preferences(&preferences) {
            warn!("Failed to save interval preference: {}", e);
        }

        Ok(self.render())
    }

    /// Stop the timer and persist its state together with whether it was
    /// running, so the next process can resume it.
    pub fn save_instance(&self) -> Result<InstanceState, PersistenceError> {
        let running = self.engine.is_running();
        self.engine.stop();

        let state = InstanceState {
            timer: self.engine.snapshot(),
            running,
        };
        self.store.save_instance(&state)?;
        info!("Saved timer state (running={})", running);
        Ok(state)
    }

    /// Restore saved state, restarting the timer if it was running.
    ///
    /// Returns the state that was applied, or `None` when nothing was saved.
    pub fn restore_instance(&self) -> Option<InstanceState> {
        let state = self.store.load_instance()?;
        self.engine.restore(&state.timer);

        if state.running {
            info!("Resuming timer from saved state");
            self.engine.start();
        }
        self.render();
        Some(state)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
