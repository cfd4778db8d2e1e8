// Test decoders built from POSIX tools

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::model::MediaInfo;
use crate::engine::frame_source::{FrameSource, FrameSourceOptions};
use crate::ports::DecodePort;

/// Emits zeroed frames through `head`/`cat` instead of ffmpeg.
/// Streams hold `frames` frames; `frames == 0` streams forever.
pub struct FakeDecoder {
    pub frame_size: usize,
    pub frames: u64,
    pub seek_bytes: usize,
}

impl DecodePort for FakeDecoder {
    fn seek_command(&self, _file_path: &Path, _at: f64) -> Command {
        let mut command = Command::new("head");
        command.args(["-c", &self.seek_bytes.to_string(), "/dev/zero"]);
        command
    }

    fn stream_command(&self, _file_path: &Path, _from: f64) -> Command {
        if self.frames == 0 {
            let mut command = Command::new("cat");
            command.arg("/dev/zero");
            command
        } else {
            let bytes = self.frame_size as u64 * self.frames;
            let mut command = Command::new("head");
            command.args(["-c", &bytes.to_string(), "/dev/zero"]);
            command
        }
    }
}

/// A decoder that never writes and never exits on its own
pub struct HungDecoder;

impl DecodePort for HungDecoder {
    fn seek_command(&self, _file_path: &Path, _at: f64) -> Command {
        let mut command = Command::new("sleep");
        command.arg("30");
        command
    }

    fn stream_command(&self, _file_path: &Path, _from: f64) -> Command {
        let mut command = Command::new("sleep");
        command.arg("30");
        command
    }
}

/// 4x2, 25 fps source whose decoder hangs; both timeouts set to `timeout`
pub fn hung_source(timeout: Duration) -> FrameSource {
    let info = MediaInfo::new("hung.mp4", 4, 2, 25.0, 20.0).unwrap();
    let options = FrameSourceOptions {
        stop_timeout: timeout,
        decode_timeout: timeout,
        ..FrameSourceOptions::default()
    };
    FrameSource::new("hung.mp4", info, Arc::new(HungDecoder), options)
}

/// 4x2 source of the given rate and duration backed by a [`FakeDecoder`]
pub fn fake_source(frame_rate: f64, duration: f64, frames: u64, seek_bytes: Option<usize>) -> FrameSource {
    let info = MediaInfo::new("fake.mp4", 4, 2, frame_rate, duration).unwrap();
    let frame_size = info.frame_size_bytes();
    let decoder = FakeDecoder {
        frame_size,
        frames,
        seek_bytes: seek_bytes.unwrap_or(frame_size),
    };
    FrameSource::new("fake.mp4", info, Arc::new(decoder), FrameSourceOptions::default())
}
