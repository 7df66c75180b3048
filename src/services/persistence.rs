//! On-disk preferences and instance state
//!
//! Two small JSON documents live in the state directory:
//! - `preferences.json`: the interval the user last selected
//! - `instance.json`: the timer snapshot and running flag saved at shutdown
//!
//! Writes are atomic (temp file + rename). Reads never fail: a missing file
//! yields defaults, and unreadable or malformed content is logged and replaced
//! by defaults so a bad file cannot stop the timer from starting.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::PersistenceError, state::InstanceState};

const PREFERENCES_FILE: &str = "preferences.json";
const INSTANCE_FILE: &str = "instance.json";

/// Stored user preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}

/// Reads and writes state files in one directory
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Create a store over `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_preferences(&self) -> Preferences {
        match self.read_json(PREFERENCES_FILE) {
            Some(value) => Preferences {
                interval_ms: value
                    .get("interval_ms")
                    .and_then(Value::as_u64)
                    .filter(|&ms| ms > 0),
            },
            None => Preferences::default(),
        }
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<(), PersistenceError> {
        self.write_json(PREFERENCES_FILE, preferences)
    }

    /// Load saved instance state, or `None` when nothing was saved
    pub fn load_instance(&self) -> Option<InstanceState> {
        self.read_json(INSTANCE_FILE)
            .map(|value| InstanceState::from_value(&value))
    }

    pub fn save_instance(&self, state: &InstanceState) -> Result<(), PersistenceError> {
        self.write_json(INSTANCE_FILE, state)
    }

    fn read_json(&self, name: &str) -> Option<Value> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved state");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read saved state, using defaults");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupted saved state, using defaults");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(value)?;
        atomic_write(&self.dir.join(name), json.as_bytes())?;
        Ok(())
    }
}

/// Write to a sibling temp file, sync, then rename over `path`
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}
