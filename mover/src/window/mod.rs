/// Active-window tracking.
///
/// A [`WindowSource`] answers "what is the focused window called right now";
/// the [`tracker`] polls it and keeps the latest answer in a [`WindowCell`]
/// that the mover reads when a recording stops.
pub mod command;
pub mod native;
pub mod tracker;

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;

use crate::error::SampleError;
use crate::sanitize::sanitize;

/// Title reported when nothing has focus.
pub const DESKTOP_TITLE: &str = "Desktop";

/// Returns the title of the currently focused window.
///
/// Implementations may block (spawn a process, call into the OS); callers run
/// them off the async executor.
pub trait WindowSource: Send + Sync {
    fn active_window_title(&self) -> Result<String, SampleError>;
}

/// Picks the command source when a track command is configured, otherwise the
/// native lookup for this platform.
pub fn source_for(track_command: Option<&str>) -> Arc<dyn WindowSource> {
    match track_command {
        Some(cmd) => Arc::new(command::CommandSource::new(cmd)),
        None => Arc::new(native::NativeSource),
    }
}

/// Last successfully sampled window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedWindow {
    title: String,
    sanitized: String,
    last_updated: DateTime<Local>,
}

impl TrackedWindow {
    /// Computes the sanitized form together with the title so the two never
    /// disagree.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let sanitized = sanitize(&title);
        Self {
            title,
            sanitized,
            last_updated: Local::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    pub fn last_updated(&self) -> DateTime<Local> {
        self.last_updated
    }
}

/// Shared holder of the current [`TrackedWindow`]. Cloning shares the cell.
#[derive(Debug, Clone, Default)]
pub struct WindowCell(Arc<RwLock<Option<TrackedWindow>>>);

impl WindowCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current value; `None` until the first successful sample.
    pub async fn snapshot(&self) -> Option<TrackedWindow> {
        self.0.read().await.clone()
    }

    /// Replaces the current value.
    pub async fn store(&self, window: TrackedWindow) {
        *self.0.write().await = Some(window);
    }
}
