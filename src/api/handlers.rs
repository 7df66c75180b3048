//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    engine::interval_from_millis,
    state::{AppState, INTERVAL_PRESETS_MINUTES},
};
use super::responses::{
    ApiResponse, HealthResponse, IntervalRequest, PresetsResponse, StatusResponse,
};

/// Handle POST /timer/toggle - Start, stop or reset depending on state
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let progress = state.toggle();
    info!("Toggle endpoint called - timer is now {:?}", progress.status);
    Json(ApiResponse::new("Timer toggled".to_string(), progress))
}

/// Handle POST /timer/start - Start or resume the timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let progress = state.start();
    Json(ApiResponse::new("Timer started".to_string(), progress))
}

/// Handle POST /timer/stop - Pause the timer
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let progress = state.stop();
    Json(ApiResponse::new("Timer stopped".to_string(), progress))
}

/// Handle POST /timer/reset - Reset a stopped timer
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state.reset() {
        Ok(progress) => Ok(Json(ApiResponse::new("Timer reset".to_string(), progress))),
        Err(e) => {
            warn!("Reset refused: {}", e);
            Err((StatusCode::CONFLICT, Json(ApiResponse::error(e, state.progress()))))
        }
    }
}

/// Handle POST /timer/abandon - Stop and reset
pub async fn abandon_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let progress = state.abandon();
    Json(ApiResponse::new("Timer abandoned".to_string(), progress))
}

/// Handle PUT /timer/interval - Select a new interval
pub async fn interval_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntervalRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let bad_request = |message: String| {
        warn!("Rejected interval request: {}", message);
        (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message, state.progress())))
    };

    let millis = match (request.minutes, request.interval_ms) {
        (Some(minutes), None) => minutes.saturating_mul(60_000),
        (None, Some(millis)) => millis,
        _ => return Err(bad_request("Specify exactly one of minutes or interval_ms".to_string())),
    };

    let interval = interval_from_millis(millis).map_err(|e| bad_request(e.to_string()))?;
    let progress = state
        .update_interval(interval)
        .map_err(|e| bad_request(e.to_string()))?;

    info!("Interval endpoint called - interval set to {}", progress.display);
    Ok(Json(ApiResponse::new("Interval updated".to_string(), progress)))
}

/// Handle GET /timer/presets - List selectable intervals
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        minutes: INTERVAL_PRESETS_MINUTES.to_vec(),
        current_interval_ms: state.progress().interval_ms,
    })
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        progress: state.progress(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
