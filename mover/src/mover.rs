/// Recording relocation: the control loop that turns a stop event plus the
/// tracked window into one move per recording file.
///
/// For a recording OBS reports at `<dir>/<file>` the destination is
///   `<dir>/<dest_base>/<folder>/<file>`
/// where `<folder>` is the sanitized title of the window that was focused
/// when the recording stopped, replaced by its shorthand if one exists. An
/// absolute `dest_base` ignores `<dir>`.
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::MoveError;
use crate::event::{MoverEvent, RecordingEvent};
use crate::sanitize::ShorthandTable;
use crate::translate::TranslationTable;
use crate::window::WindowCell;

/// Folder name used when no window has been sampled yet.
pub const UNKNOWN_WINDOW: &str = "Unknown";
/// How long to wait for a reported recording file to show up.
pub const SOURCE_GRACE: Duration = Duration::from_secs(3);
const SOURCE_POLL: Duration = Duration::from_millis(250);

/// Everything the mover needs from the config, fixed at startup.
#[derive(Debug, Clone)]
pub struct MoveSettings {
    pub dest_base: String,
    pub translate: TranslationTable,
    pub shorthand: ShorthandTable,
    pub source_grace: Duration,
}

impl MoveSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dest_base: config.dest_base.clone(),
            translate: config.translate.clone(),
            shorthand: config.shorthand.clone(),
            source_grace: SOURCE_GRACE,
        }
    }
}

/// Where one recording file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// The recording as this process sees it (after translation).
    pub source: PathBuf,
    pub dest_dir: PathBuf,
    pub destination: PathBuf,
}

/// Computes the move for a path reported by OBS. Pure; touches no files.
pub fn plan_move(reported: &Path, folder: &str, settings: &MoveSettings) -> Result<MovePlan, MoveError> {
    let source = settings.translate.translate(reported);
    if source != reported {
        info!(
            reported = %reported.display(),
            translated = %source.display(),
            "Translated recording path"
        );
    }

    let (Some(parent), Some(file_name)) = (source.parent(), source.file_name()) else {
        return Err(MoveError::NotAFile(source));
    };
    let dest_dir = normalize_lexically(&parent.join(&settings.dest_base).join(folder));
    let destination = dest_dir.join(file_name);
    Ok(MovePlan {
        source,
        dest_dir,
        destination,
    })
}

/// Resolves `.` and `..` without touching the filesystem. `..` at the root
/// stays at the root; leading `..` on relative paths is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Blocks until `path` is a file or `grace` runs out.
fn wait_for_source(path: &Path, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        if path.is_file() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(SOURCE_POLL.min(grace));
    }
}

/// Performs `plan`. On any error the recording is still at `plan.source`.
pub fn execute_move(plan: &MovePlan, grace: Duration) -> Result<(), MoveError> {
    if !wait_for_source(&plan.source, grace) {
        return Err(MoveError::SourceMissing(plan.source.clone()));
    }
    if plan.source == plan.destination {
        debug!(path = %plan.source.display(), "Recording already in place");
        return Ok(());
    }

    std::fs::create_dir_all(&plan.dest_dir).map_err(|source| MoveError::CreateDir {
        dir: plan.dest_dir.clone(),
        source,
    })?;
    if plan.destination.exists() {
        return Err(MoveError::DestinationExists(plan.destination.clone()));
    }

    let transfer_err = |source| MoveError::Transfer {
        from: plan.source.clone(),
        to: plan.destination.clone(),
        source,
    };
    match std::fs::rename(&plan.source, &plan.destination) {
        Ok(()) => Ok(()),
        Err(e) if matches!(e.kind(), io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound) => {
            Err(transfer_err(e))
        }
        // Most likely a different filesystem: copy, then drop the original.
        Err(e) => {
            debug!(error = %e, "Rename failed, falling back to copy");
            copy_then_remove(&plan.source, &plan.destination).map_err(transfer_err)
        }
    }
}

/// Copies `from` to `to` and removes `from`. If either step fails the copy is
/// removed again so only the original remains.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let result = std::fs::copy(from, to).and_then(|_| std::fs::remove_file(from));
    if result.is_err() {
        let _ = std::fs::remove_file(to);
    }
    result
}

/// Consumes recording events one at a time and moves finished recordings.
pub struct Mover {
    cell: WindowCell,
    settings: MoveSettings,
    /// Files of the current recording announced before the stop event
    /// (OBS file splitting).
    pending: Vec<PathBuf>,
    /// Files handled on the previous stop; OBS may report them again.
    last_moved: Vec<PathBuf>,
}

impl Mover {
    pub fn new(cell: WindowCell, settings: MoveSettings) -> Self {
        Self {
            cell,
            settings,
            pending: Vec::new(),
            last_moved: Vec::new(),
        }
    }

    /// Runs until a [`MoverEvent::Shutdown`] arrives or every sender is gone.
    /// Each event is fully handled before the next one is received.
    pub async fn run(mut self, mut rx: mpsc::Receiver<MoverEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                MoverEvent::Recording(event) => {
                    self.handle(event).await;
                }
                MoverEvent::Shutdown => {
                    info!("Shutting down");
                    break;
                }
            }
        }
    }

    /// Handles one event. Returns the outcome of each attempted move (empty
    /// unless the event is a stop).
    pub async fn handle(&mut self, event: RecordingEvent) -> Vec<Result<PathBuf, MoveError>> {
        match event {
            RecordingEvent::Started(path) => {
                self.pending.clear();
                match path {
                    Some(path) => {
                        info!(path = %path.display(), "Recording started");
                        self.pending.push(path);
                    }
                    None => info!("Recording started"),
                }
                Vec::new()
            }
            RecordingEvent::FileChanged(path) => {
                info!(path = %path.display(), "Recording continues in a new file");
                if !self.pending.contains(&path) {
                    self.pending.push(path);
                }
                Vec::new()
            }
            RecordingEvent::Stopped(path) => {
                info!(path = %path.display(), "Recording stopped");
                self.on_stopped(path).await
            }
        }
    }

    async fn on_stopped(&mut self, output_path: PathBuf) -> Vec<Result<PathBuf, MoveError>> {
        let (title, sanitized) = match self.cell.snapshot().await {
            Some(window) => {
                debug!(sampled_at = %window.last_updated(), "Using last tracked window");
                (window.title().to_string(), window.sanitized().to_string())
            }
            None => {
                warn!("No window activity tracked yet; using {UNKNOWN_WINDOW:?}");
                (UNKNOWN_WINDOW.to_string(), UNKNOWN_WINDOW.to_string())
            }
        };
        let folder = self.settings.shorthand.resolve(&sanitized).to_string();
        info!(window_title = %title, sanitized = %sanitized, folder = %folder, "Active window at stop");

        let mut files = std::mem::take(&mut self.pending);
        if !files.contains(&output_path) {
            files.push(output_path);
        }
        files.retain(|f| {
            let seen = self.last_moved.contains(f);
            if seen {
                debug!(path = %f.display(), "Already handled, skipping");
            }
            !seen
        });

        let mut outcomes = Vec::with_capacity(files.len());
        for file in &files {
            outcomes.push(self.move_one(file, &title, &folder).await);
        }
        if !files.is_empty() {
            self.last_moved = files;
        }
        outcomes
    }

    async fn move_one(&self, reported: &Path, title: &str, folder: &str) -> Result<PathBuf, MoveError> {
        let plan = match plan_move(reported, folder, &self.settings) {
            Ok(plan) => plan,
            Err(e) => {
                error!(
                    error = %e,
                    source = %reported.display(),
                    window_title = %title,
                    "Failed to move recording; it was left in place"
                );
                return Err(e);
            }
        };

        let job = plan.clone();
        let grace = self.settings.source_grace;
        let result = tokio::task::spawn_blocking(move || execute_move(&job, grace))
            .await
            .map_err(|e| MoveError::Join(e.to_string()))
            .and_then(|r| r);

        match result {
            Ok(()) => {
                info!(destination = %plan.destination.display(), "Recording moved");
                Ok(plan.destination)
            }
            Err(e) => {
                error!(
                    error = %e,
                    source = %plan.source.display(),
                    destination = %plan.destination.display(),
                    window_title = %title,
                    "Failed to move recording; it was left in place"
                );
                Err(e)
            }
        }
    }
}
