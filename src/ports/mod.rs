// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe media file and return its video metadata.
    ///
    /// Fails with `SourceUnreadable` for a missing file, a file without a
    /// video stream, or a failing metadata tool.
    async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError>;
}

/// Port describing how to launch the external decoder.
///
/// Both commands must write raw `rgb24` frames of the probed size to stdout.
pub trait DecodePort: Send + Sync {
    /// One-shot decode of exactly one frame at `at` seconds
    fn seek_command(&self, file_path: &Path, at: f64) -> Command;

    /// Sequential decode starting at `from` seconds, until end of stream
    fn stream_command(&self, file_path: &Path, from: f64) -> Command;
}

/// Segments read back from a label file
#[derive(Debug, Clone, Default)]
pub struct SidecarLoad {
    /// Segments in stored order
    pub segments: Vec<Segment>,
    /// Stream facts recorded at save time, if the file was readable
    pub recorded: Option<RecordedMedia>,
    /// Non-fatal problems met while reading
    pub warnings: Vec<String>,
}

/// Media facts stored alongside the labels
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMedia {
    pub frame_rate: f64,
    pub frame_count: u64,
    pub duration: f64,
}

/// Port for label persistence
#[async_trait]
pub trait SidecarPort: Send + Sync {
    /// Label file path for a video
    fn sidecar_path(&self, video_path: &Path) -> PathBuf;

    /// Write segments and freshly computed analytics next to the video
    async fn save(
        &self,
        video_path: &Path,
        segments: &[Segment],
        media: &MediaInfo,
    ) -> Result<PathBuf, DomainError>;

    /// Read segments back. Missing or corrupt files yield an empty list with
    /// a warning rather than an error. Segments are rebuilt at `frame_rate`
    /// when given, otherwise at the rate stored in the file.
    async fn load(&self, sidecar_path: &Path, frame_rate: Option<f64>) -> SidecarLoad;
}
