//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Signals that end the server; each one triggers a state save first
pub const SHUTDOWN_SIGNALS: [i32; 3] = [SIGTERM, SIGINT, SIGHUP];

/// Wait for the first shutdown signal.
///
/// Falls back to Ctrl-C handling if the signal stream cannot be registered.
pub async fn shutdown_signal() {
    let mut signals = match Signals::new(SHUTDOWN_SIGNALS) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to register signal handlers ({}), only Ctrl-C will stop the server", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };
    let handle = signals.handle();

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    handle.close();
}
