use std::path::PathBuf;

/// Recording lifecycle as reported by OBS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingEvent {
    /// A recording began writing. OBS names the first output file here; later
    /// files of a split recording arrive as [`RecordingEvent::FileChanged`].
    Started(Option<PathBuf>),
    /// OBS split the recording and began a new file; the path is the new file.
    FileChanged(PathBuf),
    /// The recording finished; the path is the final output file as OBS sees it.
    /// Self-contained: no prior `Started` is needed to act on it.
    Stopped(PathBuf),
}

#[derive(Debug)]
pub enum MoverEvent {
    Recording(RecordingEvent),
    /// Ctrl+C received; finish the current event and exit.
    Shutdown,
}
