use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::sanitize::ShorthandTable;
use crate::translate::TranslationTable;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 4455;
/// Relative to the recording's folder: per-window folders become its siblings.
pub const DEFAULT_DEST_BASE: &str = "..";
pub const DEFAULT_TRACK_INTERVAL_SECS: u64 = 1;

/// Mover configuration. Deserialized from `<config dir>/obs-recording-mover/config.toml`
/// and merged with command-line overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// OBS WebSocket host.
    #[serde(default = "default_host")]
    pub host: String,
    /// OBS WebSocket port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// OBS WebSocket password; empty when authentication is disabled.
    #[serde(default)]
    pub password: String,
    /// Where per-window folders go, relative to the recording's folder.
    #[serde(default = "default_dest_base")]
    pub dest_base: String,
    /// Seconds between window samples. Must be at least 1.
    #[serde(default = "default_track_interval")]
    pub track_interval_secs: u64,
    /// Shell command printing the active window title. `None` uses the native
    /// lookup.
    #[serde(default)]
    pub track_command: Option<String>,
    #[serde(default)]
    pub translate: TranslationTable,
    #[serde(default)]
    pub shorthand: ShorthandTable,
    /// `host:port` → unix time of the last successful connection. Startup
    /// waits for a known endpoint instead of failing.
    #[serde(default)]
    pub known_endpoints: BTreeMap<String, i64>,
    /// Diagnostic-only; never read from or written to disk.
    #[serde(skip)]
    pub check_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
            dest_base: DEFAULT_DEST_BASE.to_string(),
            track_interval_secs: DEFAULT_TRACK_INTERVAL_SECS,
            track_command: None,
            translate: TranslationTable::default(),
            shorthand: ShorthandTable::default(),
            known_endpoints: BTreeMap::new(),
            check_only: false,
        }
    }
}

/// The fields written back to disk. Anything not listed here stays out of
/// the config file.
#[derive(Serialize)]
struct PersistedConfig<'a> {
    host: &'a str,
    port: u16,
    password: &'a str,
    dest_base: &'a str,
    track_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    track_command: Option<&'a str>,
    translate: &'a TranslationTable,
    shorthand: &'a ShorthandTable,
    known_endpoints: &'a BTreeMap<String, i64>,
}

impl<'a> From<&'a Config> for PersistedConfig<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            host: &config.host,
            port: config.port,
            password: &config.password,
            dest_base: &config.dest_base,
            track_interval_secs: config.track_interval_secs,
            track_command: config.track_command.as_deref(),
            translate: &config.translate,
            shorthand: &config.shorthand,
            known_endpoints: &config.known_endpoints,
        }
    }
}

impl Config {
    /// Applies command-line overrides. `-T`/`-S` are parsed here so malformed
    /// JSON fails startup instead of silently routing recordings elsewhere.
    pub fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(password) = &args.password {
            self.password = password.clone();
        }
        if let Some(dest_base) = &args.dest_base {
            self.dest_base = dest_base.clone();
        }
        if let Some(secs) = args.track_interval {
            self.track_interval_secs = secs;
        }
        if let Some(command) = &args.track_command {
            let command = command.trim();
            self.track_command = (!command.is_empty()).then(|| command.to_string());
        }
        if let Some(json) = &args.translate {
            self.translate = parse_mapping("--translate", json)?.into_iter().collect();
        }
        if let Some(json) = &args.shorthand {
            self.shorthand = parse_mapping("--shorthand", json)?.into_iter().collect();
        }
        self.check_only = args.check_track;
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn track_interval(&self) -> Duration {
        Duration::from_secs(self.track_interval_secs)
    }

    /// Key used in `known_endpoints`.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the configured endpoint has ever been connected to.
    pub fn is_known_endpoint(&self) -> bool {
        self.known_endpoints.contains_key(&self.endpoint())
    }

    /// Records a successful connection to the configured endpoint.
    pub fn remember_endpoint(&mut self, unix_secs: i64) {
        self.known_endpoints.insert(self.endpoint(), unix_secs);
    }

    /// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the persisted fields to `path`, creating its directory.
    ///
    /// Writes to a sibling temp file first so a crash mid-write never leaves
    /// a truncated config behind.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(&PersistedConfig::from(self))?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, text).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)
    }
}

/// Parses a flat JSON object of strings, keeping the order keys were written in.
/// An empty argument means an empty table.
pub fn parse_mapping(flag: &'static str, json: &str) -> Result<Vec<(String, String)>, ConfigError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let invalid = |reason: String| ConfigError::Mapping { flag, reason };
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(invalid("expected a JSON object like {\"from\": \"to\"}".to_string()));
    };
    map.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(invalid(format!("value for {key:?} must be a string, got {other}"))),
        })
        .collect()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_dest_base() -> String {
    DEFAULT_DEST_BASE.to_string()
}

fn default_track_interval() -> u64 {
    DEFAULT_TRACK_INTERVAL_SECS
}
