use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{TrackedWindow, WindowCell, WindowSource};
use crate::error::SampleError;

/// Samples `source` every `every` and stores each successful result in `cell`
/// until `shutdown` flips to `true` (or its sender is dropped).
///
/// A failed sample leaves the previous value in place. Repeated identical
/// failures are logged once, so a missing tool does not flood the log every
/// second.
pub async fn run(
    source: Arc<dyn WindowSource>,
    cell: WindowCell,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_error: Option<String> = None;
    let mut last_title: Option<String> = None;

    info!(interval_secs = every.as_secs_f64(), "Window tracking started");

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        match sample(&source).await {
            Ok(title) => {
                if last_error.take().is_some() {
                    info!("Window tracking recovered");
                }
                if last_title.as_deref() != Some(title.as_str()) {
                    debug!(title = %title, "Active window changed");
                    last_title = Some(title.clone());
                }
                cell.store(TrackedWindow::new(title)).await;
            }
            Err(e) => {
                let message = e.to_string();
                if last_error.as_deref() != Some(message.as_str()) {
                    warn!(error = %e, "Unable to get window title; keeping the previous one");
                }
                last_error = Some(message);
            }
        }
    }

    info!("Window tracking stopped");
}

/// Runs one sample on the blocking pool.
async fn sample(source: &Arc<dyn WindowSource>) -> Result<String, SampleError> {
    let source = Arc::clone(source);
    tokio::task::spawn_blocking(move || source.active_window_title())
        .await
        .map_err(|e| SampleError::Join(e.to_string()))?
}
