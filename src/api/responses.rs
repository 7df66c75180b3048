//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::Progress;

/// API response structure for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub progress: Progress,
}

impl ApiResponse {
    /// Create a response whose status mirrors the timer status
    pub fn new(message: String, progress: Progress) -> Self {
        Self::with_status(progress.status.as_str().to_string(), message, progress)
    }

    fn with_status(status: String, message: String, progress: Progress) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            progress,
        }
    }

    /// Create an error response
    pub fn error(message: String, progress: Progress) -> Self {
        Self::with_status("error".to_string(), message, progress)
    }
}

/// Body of `PUT /timer/interval`; exactly one field must be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalRequest {
    pub minutes: Option<i64>,
    pub interval_ms: Option<i64>,
}

/// Enhanced status response with host information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub progress: Progress,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Selectable interval presets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub minutes: Vec<u64>,
    pub current_interval_ms: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
