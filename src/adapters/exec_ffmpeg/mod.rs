//! FFmpeg execution adapter
//!
//! Builds the decoder invocations used by the frame source. Every command
//! writes raw `rgb24` frames to stdout and nothing else.

use std::path::Path;

use tokio::process::Command;

use crate::ports::*;

/// FFmpeg-based decode adapter
pub struct FFmpegAdapter {
    program: String,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter running the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn base_command(&self, file_path: &Path, at: f64) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-nostdin", "-v", "quiet"])
            .args(["-ss", &format!("{:.3}", at.max(0.0))])
            .arg("-i")
            .arg(file_path);
        command
    }
}

impl DecodePort for FFmpegAdapter {
    fn seek_command(&self, file_path: &Path, at: f64) -> Command {
        let mut command = self.base_command(file_path, at);
        command
            .args(["-frames:v", "1"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-");
        command
    }

    fn stream_command(&self, file_path: &Path, from: f64) -> Command {
        let mut command = self.base_command(file_path, from);
        command
            .args(["-an", "-sn"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-");
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_seek_command_decodes_one_frame() {
        let adapter = FFmpegAdapter::new("ffmpeg");
        let command = adapter.seek_command(Path::new("/videos/cam.mp4"), 12.3456);
        let args = args(&command);

        assert_eq!(command.as_std().get_program(), "ffmpeg");
        assert!(args.windows(2).any(|w| w == ["-ss", "12.346"]));
        assert!(args.windows(2).any(|w| w == ["-frames:v", "1"]));
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "rgb24"]));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[test]
    fn test_stream_command_has_no_frame_limit() {
        let adapter = FFmpegAdapter::new("/opt/ffmpeg/bin/ffmpeg");
        let command = adapter.stream_command(Path::new("cam.mp4"), 0.0);
        let args = args(&command);

        assert!(args.windows(2).any(|w| w == ["-ss", "0.000"]));
        assert!(!args.iter().any(|a| a == "-frames:v"));
        assert!(args.iter().any(|a| a == "-nostdin"));
    }
}
