//! Timer runtime
//!
//! Two independent periodic timers on the shared runtime: a 1-second game
//! tick and a long-period tracker poll. The poll interval fires immediately,
//! giving the initial fetch on startup; the tick waits out its first second.
//! All logic lives in `App` methods, so everything here stays a thin loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, interval_at, Instant};
use tracing::{error, info};

use crate::app::App;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drive the app's timers until a shutdown message arrives.
pub async fn run(app: Arc<App>, poll_interval: Duration, mut shutdown_rx: mpsc::Receiver<()>) {
    let mut tick = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    let mut poll = interval(poll_interval);

    info!(poll_interval_secs = poll_interval.as_secs(), "Overlay runtime started");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                app.tick().await;
            }
            _ = poll.tick() => {
                if let Err(e) = app.poll().await {
                    error!(error = %e, "Scheduled poll failed");
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Overlay runtime shutting down");
                break;
            }
        }
    }

    app.shutdown().await;
}
