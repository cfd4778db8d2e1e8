//! External-process frame source
//!
//! Two mutually exclusive access modes over the decoder: a one-shot
//! seek-and-decode of a single frame, and a long-lived sequential stream read
//! frame by frame. At most one decoder process is alive at any time.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout};
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::DecodePort;

/// Default bound on a graceful stream shutdown before the process is killed
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Default bound on a one-shot seek decode
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default distance kept from the reported end when clamping seeks
pub const DEFAULT_END_GUARD_SECS: f64 = 0.1;

/// What the source is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Idle,
    Seeking,
    Streaming,
}

/// Tuning for a frame source
#[derive(Debug, Clone)]
pub struct FrameSourceOptions {
    /// Graceful shutdown bound for a stream process
    pub stop_timeout: Duration,
    /// Bound on a one-shot seek decode; the process is killed when it expires
    pub decode_timeout: Duration,
    /// Seeks clamp to `[0, duration - end_guard]`
    pub end_guard_secs: f64,
}

impl Default for FrameSourceOptions {
    fn default() -> Self {
        Self {
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            end_guard_secs: DEFAULT_END_GUARD_SECS,
        }
    }
}

struct ActiveStream {
    child: Child,
    stdout: ChildStdout,
    origin: f64,
    frames_read: u64,
}

/// Frame source backed by an external decoder
pub struct FrameSource {
    path: PathBuf,
    info: MediaInfo,
    decoder: Arc<dyn DecodePort>,
    options: FrameSourceOptions,
    position: f64,
    mode: SourceMode,
    stream: Option<ActiveStream>,
    buffer: Vec<u8>,
    released: bool,
}

impl FrameSource {
    /// Create a source for a probed video. No process is started.
    pub fn new(
        path: impl Into<PathBuf>,
        info: MediaInfo,
        decoder: Arc<dyn DecodePort>,
        options: FrameSourceOptions,
    ) -> Self {
        let frame_size = info.frame_size_bytes();
        Self {
            path: path.into(),
            info,
            decoder,
            options,
            position: 0.0,
            mode: SourceMode::Idle,
            stream: None,
            buffer: vec![0; frame_size],
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_info(&self) -> &MediaInfo {
        &self.info
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Nearest frame index of the current position
    pub fn current_frame_index(&self) -> u64 {
        self.info.frame_at(self.position)
    }

    pub fn duration(&self) -> f64 {
        self.info.duration
    }

    pub fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Graceful shutdown bound for the stream process
    pub fn stop_timeout(&self) -> Duration {
        self.options.stop_timeout
    }

    /// OS id of the live stream process, if any
    pub fn stream_pid(&self) -> Option<u32> {
        self.stream.as_ref().and_then(|s| s.child.id())
    }

    /// Clamp a timestamp into `[0, duration - guard]`
    pub fn clamp_time(&self, seconds: f64) -> f64 {
        let upper = (self.info.duration - self.options.end_guard_secs).max(0.0);
        if seconds.is_nan() {
            return 0.0;
        }
        seconds.clamp(0.0, upper)
    }

    /// Decode exactly one frame at `seconds`. Stops any active stream first.
    /// The position only moves on success.
    pub async fn read_frame_at(&mut self, seconds: f64) -> Result<Frame, DomainError> {
        self.ensure_live()?;
        self.stop_stream().await;

        let at = self.clamp_time(seconds);
        self.mode = SourceMode::Seeking;
        let result = self.decode_single(at).await;
        self.mode = SourceMode::Idle;

        let frame = result?;
        self.position = at;
        debug!(time = at, frame = self.current_frame_index(), "Seek decoded");
        Ok(frame)
    }

    async fn decode_single(&self, at: f64) -> Result<Frame, DomainError> {
        let mut command = self.decoder.seek_command(&self.path, at);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.options.decode_timeout, command.output())
            .await
            .map_err(|_| DomainError::DecodeFailed {
                time: at,
                message: format!(
                    "decoder did not finish within {} ms",
                    self.options.decode_timeout.as_millis()
                ),
            })?
            .map_err(|e| DomainError::DecodeFailed {
                time: at,
                message: format!("failed to start decoder: {}", e),
            })?;

        let expected = self.info.frame_size_bytes();
        if output.stdout.len() < expected {
            return Err(DomainError::DecodeFailed {
                time: at,
                message: format!(
                    "decoder produced {} bytes, expected {}",
                    output.stdout.len(),
                    expected
                ),
            });
        }

        let mut data = output.stdout;
        data.truncate(expected);
        Frame::new(self.info.width, self.info.height, data)
    }

    /// Start a sequential decode at `from_seconds`, terminating any previous
    /// stream before the new process is spawned.
    pub async fn start_stream(&mut self, from_seconds: f64) -> Result<(), DomainError> {
        self.ensure_live()?;
        self.stop_stream().await;

        let from = self.clamp_time(from_seconds);
        let mut command = self.decoder.stream_command(&self.path, from);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            DomainError::ProcessError(format!("failed to start decoder stream: {}", e))
        })?;
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill().await;
                return Err(DomainError::ProcessError(
                    "decoder stream has no stdout".to_string(),
                ));
            }
        };

        debug!(pid = ?child.id(), from, "Decoder stream started");
        self.stream = Some(ActiveStream {
            child,
            stdout,
            origin: from,
            frames_read: 0,
        });
        self.position = from;
        self.mode = SourceMode::Streaming;
        Ok(())
    }

    /// Pull one frame from the active stream.
    ///
    /// Returns `None` at end of stream: no stream, a short read, or a read
    /// error. End of stream tears the stream down. Each frame advances the
    /// position by exactly one nominal frame duration.
    pub async fn read_next_frame(&mut self) -> Option<Frame> {
        let stream = self.stream.as_mut()?;

        match stream.stdout.read_exact(&mut self.buffer).await {
            Ok(_) => {
                stream.frames_read += 1;
                self.position = stream.origin + stream.frames_read as f64 / self.info.frame_rate;
                Frame::new(self.info.width, self.info.height, self.buffer.clone()).ok()
            }
            Err(e) => {
                debug!(error = %e, frames = stream.frames_read, "Decoder stream ended");
                self.stop_stream().await;
                None
            }
        }
    }

    /// Stop the active stream. Idempotent.
    ///
    /// Closes the pipe so the decoder exits on its next write, waits up to the
    /// configured timeout, then kills it. The process is always reaped.
    pub async fn stop_stream(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        self.mode = SourceMode::Idle;

        let ActiveStream {
            mut child, stdout, ..
        } = stream;
        drop(stdout);

        let pid = child.id();
        match tokio::time::timeout(self.options.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => debug!(?pid, %status, "Decoder stream exited"),
            Ok(Err(e)) => warn!(?pid, error = %e, "Failed waiting for decoder stream"),
            Err(_) => {
                warn!(?pid, timeout_ms = self.options.stop_timeout.as_millis() as u64, "Decoder stream did not exit, killing");
                if let Err(e) = child.kill().await {
                    warn!(?pid, error = %e, "Failed to kill decoder stream");
                }
            }
        }
    }

    /// Stop any stream and free all resources. The source is unusable afterwards.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.stop_stream().await;
        self.buffer = Vec::new();
        self.released = true;
        info!(path = %self.path.display(), "Frame source released");
    }

    fn ensure_live(&self) -> Result<(), DomainError> {
        if self.released {
            Err(DomainError::SourceReleased)
        } else {
            Ok(())
        }
    }
}
