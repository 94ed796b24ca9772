/// Command-line surface. Every option except `--check-track` and `--config`
/// overrides the matching config field and is saved back to the config file.
use std::path::PathBuf;

use clap::Parser;

/// Moves finished OBS recordings into folders named after the active window.
///
/// Example:
///   recording-mover -T '{"/mnt/Recordings": "/home/smb/Recordings"}' \
///                   -S '{"OBS-move-rec-Konsole": "Konsole"}'
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "recording-mover", version, about, verbatim_doc_comment)]
pub struct Args {
    /// OBS WebSocket host (default localhost)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// OBS WebSocket port (default 4455)
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// OBS WebSocket password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Folder, relative to the recording's folder, under which per-window
    /// folders are created (default "..")
    #[arg(short = 'd', long = "dest-base", value_name = "DIR")]
    pub dest_base: Option<String>,

    /// Window tracking interval in seconds (default 1)
    #[arg(short = 't', long = "track-interval", value_name = "SECS")]
    pub track_interval: Option<u64>,

    /// Command whose output is the active window title, e.g. for Wayland
    /// compositors. Pass an empty string to go back to native tracking.
    #[arg(short = 'c', long = "track-command", value_name = "CMD")]
    pub track_command: Option<String>,

    /// Path translation as a JSON object of prefix → prefix; first match wins
    #[arg(short = 'T', long, value_name = "JSON")]
    pub translate: Option<String>,

    /// Shorthand folder names as a JSON object of sanitized title → name
    #[arg(short = 'S', long, value_name = "JSON")]
    pub shorthand: Option<String>,

    /// Only print which window would be tracked and its sanitized title
    #[arg(short = 'C', long = "check-track")]
    pub check_track: bool,

    /// Use this config file instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
