//! Display formatting helpers

use std::time::Duration;

/// Format a duration as `MM:SS`, truncating sub-second remainders.
///
/// Minutes are not wrapped into hours, so 75 minutes reads `75:00`.
pub fn format_clock(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format a duration as a compact uptime string such as `1h 2m 5s`
pub fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
