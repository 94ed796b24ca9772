/// Window source backed by an operator-supplied shell command, for setups the
/// native lookup cannot see (Wayland compositors, remote sessions).
use std::process::Command;

use super::{WindowSource, DESKTOP_TITLE};
use crate::error::SampleError;

pub struct CommandSource {
    command: String,
}

impl CommandSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

impl WindowSource for CommandSource {
    fn active_window_title(&self) -> Result<String, SampleError> {
        capture_title(&mut self.shell(), &self.command)
    }
}

/// Runs `cmd` and returns its stdout with trailing whitespace removed.
/// Empty output means nothing has focus.
pub(super) fn capture_title(cmd: &mut Command, label: &str) -> Result<String, SampleError> {
    let output = cmd.output().map_err(|source| SampleError::Spawn {
        command: label.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(SampleError::ExitStatus {
            command: label.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8(output.stdout).map_err(|_| SampleError::InvalidOutput {
        command: label.to_string(),
    })?;
    let title = stdout.trim_end();
    if title.is_empty() {
        Ok(DESKTOP_TITLE.to_string())
    } else {
        Ok(title.to_string())
    }
}
