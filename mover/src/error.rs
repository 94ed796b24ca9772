/// Error taxonomy for the mover.
///
/// Only [`ConnectionError`] (at startup) and [`ConfigError`] are allowed to end
/// the process. [`SampleError`] and [`MoveError`] are scoped to one tracker
/// tick or one recording and are logged by whoever hit them.
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to reach, handshake with, or authenticate to OBS.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("could not connect to OBS WebSocket at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("no answer from OBS WebSocket at {url} within {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("OBS rejected the password (check --password)")]
    Authentication,

    #[error("OBS closed the connection during the handshake: {0}")]
    Closed(String),

    #[error("unexpected message during the handshake: {0}")]
    Handshake(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed message from OBS: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shutdown requested while connecting")]
    Cancelled,
}

impl ConnectionError {
    /// Errors that retrying will not fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ConnectionError::Authentication)
    }
}

/// A single failed window-title sample.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` printed output that is not valid UTF-8")]
    InvalidOutput { command: String },

    #[error("native window lookup is not available: {0}")]
    Unsupported(String),

    #[error("sampling task failed: {0}")]
    Join(String),
}

/// Failure to relocate one recording. The source file is left where it was.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("recording file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("recording path has no file name or parent directory: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("refusing to overwrite existing file {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("could not create {}: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not move {} to {}: {source}", .from.display(), .to.display())]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("move task failed: {0}")]
    Join(String),
}

/// Invalid configuration file or command-line overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid {flag} value: {reason}")]
    Mapping { flag: &'static str, reason: String },

    #[error("track interval must be at least 1 second")]
    ZeroInterval,

    #[error("no configuration directory could be determined for this platform")]
    NoConfigDir,
}
