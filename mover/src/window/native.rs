/// Native active-window lookup.
///
/// Windows asks Win32 directly. macOS and X11 desktops go through the stock
/// tools (`osascript`, `xdotool`) that expose the same information; Wayland
/// users configure a track command instead.
use super::WindowSource;
use crate::error::SampleError;

pub struct NativeSource;

impl WindowSource for NativeSource {
    fn active_window_title(&self) -> Result<String, SampleError> {
        imp::foreground_title()
    }
}

#[cfg(windows)]
mod imp {
    use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

    use crate::error::SampleError;
    use crate::window::DESKTOP_TITLE;

    pub fn foreground_title() -> Result<String, SampleError> {
        let mut buf = [0u16; 512];
        // A null foreground window yields a zero-length title.
        let len = unsafe {
            let hwnd = GetForegroundWindow();
            GetWindowTextW(hwnd, &mut buf)
        };
        let len = usize::try_from(len).unwrap_or(0).min(buf.len());
        let title = String::from_utf16_lossy(&buf[..len]);
        if title.trim().is_empty() {
            Ok(DESKTOP_TITLE.to_string())
        } else {
            Ok(title)
        }
    }
}

#[cfg(target_os = "macos")]
mod imp {
    use std::process::Command;

    use crate::error::SampleError;
    use crate::window::command::capture_title;

    const SCRIPT: &str = r#"tell application "System Events" to get name of front window of (first application process whose frontmost is true)"#;

    pub fn foreground_title() -> Result<String, SampleError> {
        capture_title(Command::new("osascript").arg("-e").arg(SCRIPT), "osascript")
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
mod imp {
    use std::io;
    use std::process::Command;

    use crate::error::SampleError;
    use crate::window::command::capture_title;

    pub fn foreground_title() -> Result<String, SampleError> {
        capture_title(
            Command::new("xdotool").args(["getactivewindow", "getwindowname"]),
            "xdotool getactivewindow getwindowname",
        )
        .map_err(|e| match e {
            SampleError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                SampleError::Unsupported(
                    "xdotool is not installed; install it or pass --track-command".to_string(),
                )
            }
            other => other,
        })
    }
}

#[cfg(not(any(windows, unix)))]
mod imp {
    use crate::error::SampleError;

    pub fn foreground_title() -> Result<String, SampleError> {
        Err(SampleError::Unsupported(
            "no native window lookup on this platform; pass --track-command".to_string(),
        ))
    }
}
