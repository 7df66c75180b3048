//! Enhance Your Calm - A meditation countdown timer
//! 
//! This is the main entry point for the enhance-your-calm server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use enhance_your_calm::{
    api::create_router,
    config::Config,
    engine::TimerEngine,
    services::StateStore,
    state::{initial_interval, AppState},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("enhance_your_calm={},tower_http=info", config.log_level()))
        .init();

    info!("Starting enhance-your-calm v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_dir={}",
          config.host, config.port, config.state_dir.display());

    // Initial interval from the command line or the stored preference
    let store = StateStore::new(&config.state_dir)?;
    let interval = initial_interval(config.interval, &store.load_preferences());
    let engine = TimerEngine::new(interval)?;

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        engine,
        store,
        config.alarm_command.clone(),
    ));

    // Resume a countdown interrupted by the previous shutdown
    if config.interval.is_none() {
        state.restore_instance();
    } else {
        info!("Interval given on the command line, ignoring saved timer state");
    }
    let progress = state.render();
    info!("Timer ready: {} ({})", progress.display, progress.message);

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/toggle   - Start, stop or reset the timer");
    info!("  POST /timer/start    - Start or resume the timer");
    info!("  POST /timer/stop     - Pause the timer");
    info!("  POST /timer/reset    - Reset a stopped timer");
    info!("  POST /timer/abandon  - Stop and reset the timer");
    info!("  PUT  /timer/interval - Select a new interval");
    info!("  GET  /timer/presets  - List interval presets");
    info!("  GET  /status         - Check current progress");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Save the countdown so the next start can pick it up
    state.save_instance()?;

    info!("Server shutdown complete");
    Ok(())
}
