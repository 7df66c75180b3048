//! Alarm played when a meditation ends

use tokio::process::Command;
use tracing::{error, info, warn};

use crate::engine::TimerListener;

/// Run the alarm command line.
///
/// The line is split with shell quoting rules; the first word is the program.
pub async fn play_alarm(command_line: &str) -> Result<(), String> {
    let argv = shlex::split(command_line)
        .filter(|argv| !argv.is_empty())
        .ok_or_else(|| format!("Invalid alarm command: {:?}", command_line))?;

    info!("Playing alarm: {}", command_line);

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .output()
        .await
        .map_err(|e| format!("Failed to execute alarm command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Alarm command failed: {}", stderr.trim()));
    }

    Ok(())
}

/// Plays the alarm when the timer elapses
#[derive(Debug, Clone, Default)]
pub struct AlarmListener {
    command: Option<String>,
}

impl AlarmListener {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl TimerListener for AlarmListener {
    fn on_tick(&self, _remaining: std::time::Duration) {}

    fn on_elapsed(&self) {
        let Some(command) = self.command.clone() else {
            info!("Meditation complete (no alarm command configured)");
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = play_alarm(&command).await {
                        error!("{}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime available to play alarm"),
        }
    }
}
