//! Persistable timer state

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timer fields saved across a process restart, in milliseconds.
///
/// Every field is optional so that partially written or hand-edited state
/// still restores; see [`Countdown::from_snapshot`](super::Countdown::from_snapshot)
/// for the fallbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_interval_ms: Option<u64>,
}

/// Snapshot plus the running flag, as stored by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    #[serde(flatten)]
    pub timer: TimerSnapshot,
    #[serde(default)]
    pub running: bool,
}

impl InstanceState {
    /// Decode instance state field by field.
    ///
    /// Fields with the wrong type or a negative value are treated as missing
    /// rather than failing the whole document.
    pub fn from_value(value: &Value) -> Self {
        let millis = |key: &str| value.get(key).and_then(Value::as_u64);

        Self {
            timer: TimerSnapshot {
                interval_ms: millis("interval_ms"),
                adjusted_interval_ms: millis("adjusted_interval_ms"),
                remaining_interval_ms: millis("remaining_interval_ms"),
            },
            running: value.get("running").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}
