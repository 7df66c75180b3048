//! Periodic tick task driving a running timer

use std::{sync::Weak, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::engine::Shared;

/// Spawn the ticker for one run of a timer.
///
/// The first tick fires one `cadence` after spawning. The task ends when the
/// timer elapses, when the run is superseded by a stop/reset/restart, or when
/// every engine handle has been dropped.
pub(crate) fn spawn_ticker(shared: Weak<Shared>, run: u64, cadence: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + cadence, cadence);
        // Late ticks are fine; remaining time comes from the start timestamp
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let Some(shared) = shared.upgrade() else {
                debug!("Timer dropped, ticker for run {} exiting", run);
                break;
            };
            if !shared.tick(run) {
                debug!("Ticker for run {} finished", run);
                break;
            }
        }
    })
}
