/// Check-only mode: run the window tracker alone and print what it sees, so
/// shorthand keys can be copied from real sanitized titles.
use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::config::Config;
use crate::sanitize::ShorthandTable;
use crate::window::{self, tracker, TrackedWindow, WindowCell};

/// Minimum extra focus time before a title is printed again.
pub const CHECK_PRINT_EVERY: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Focus {
    active: Duration,
    printed_at: Option<Duration>,
}

/// Accumulated focus time per raw title.
#[derive(Debug, Default)]
pub struct FocusLog {
    titles: HashMap<String, Focus>,
}

impl FocusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `title` with `elapsed` focus time. Returns the total when the
    /// title is due to be printed: on first sight and after every further
    /// [`CHECK_PRINT_EVERY`].
    pub fn observe(&mut self, title: &str, elapsed: Duration) -> Option<Duration> {
        let focus = self.titles.entry(title.to_string()).or_default();
        focus.active += elapsed;
        let due = match focus.printed_at {
            None => true,
            Some(at) => focus.active.saturating_sub(at) >= CHECK_PRINT_EVERY,
        };
        if due {
            focus.printed_at = Some(focus.active);
            Some(focus.active)
        } else {
            None
        }
    }
}

/// One report line for `window`.
pub fn report_line(window: &TrackedWindow, shorthand: &ShorthandTable, active: Duration) -> String {
    let mut line = format!(
        "{:?} -> {} ({}s active)",
        window.title(),
        window.sanitized(),
        active.as_secs()
    );
    if let Some(short) = shorthand.get(window.sanitized()) {
        line.push_str(&format!(" [shorthand: {short}]"));
    }
    line
}

/// Tracks and prints until Ctrl+C. Never connects to OBS or touches files.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let every = config.track_interval();
    let cell = WindowCell::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let source = window::source_for(config.track_command.as_deref());
    let tracker = tokio::spawn(tracker::run(source, cell.clone(), every, shutdown_rx));

    println!("Checking window tracking every {}s. Press Ctrl+C to stop.", every.as_secs());
    if config.shorthand.is_empty() {
        println!("No shorthands configured; add one with -S '{{\"<sanitized title>\": \"<folder>\"}}'.");
    }

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately, before the tracker has sampled.
    ticker.tick().await;

    let mut log = FocusLog::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(window) = cell.snapshot().await {
                    if let Some(active) = log.observe(window.title(), every) {
                        println!("{}", report_line(&window, &config.shorthand, active));
                    }
                }
            }
            res = &mut ctrl_c => {
                res?;
                break;
            }
        }
    }

    info!("Check mode stopping");
    let _ = shutdown_tx.send(true);
    tracker.await?;
    Ok(())
}
