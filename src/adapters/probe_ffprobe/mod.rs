//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` as an external process and reads its JSON report.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Frame rate assumed when the stream reports a zero denominator
const FALLBACK_FRAME_RATE: f64 = 25.0;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    program: String,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter running the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse an `ffprobe -print_format json -show_streams -show_format` report
pub fn parse_probe_report(path: &str, json: &str) -> Result<MediaInfo, DomainError> {
    let report: ProbeReport = serde_json::from_str(json).map_err(|e| {
        DomainError::SourceUnreadable(format!("{}: unparseable probe output: {}", path, e))
    })?;

    let stream = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DomainError::SourceUnreadable(format!("{}: no video stream found", path)))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(DomainError::SourceUnreadable(format!(
                "{}: video stream has no dimensions",
                path
            )))
        }
    };

    let frame_rate = stream
        .r_frame_rate
        .as_deref()
        .map(parse_rational)
        .transpose()
        .map_err(|e| DomainError::SourceUnreadable(format!("{}: {}", path, e)))?
        .unwrap_or(FALLBACK_FRAME_RATE);

    let duration = report
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(stream.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    let mut info = MediaInfo::new(path, width, height, frame_rate, duration)
        .map_err(|e| DomainError::SourceUnreadable(format!("{}: {}", path, e)))?;
    if info.frame_count == 0 {
        return Err(DomainError::SourceUnreadable(format!(
            "{}: stream reports no frames",
            path
        )));
    }
    if let Some(codec) = &stream.codec_name {
        info = info.with_codec(codec.clone());
    }
    Ok(info)
}

/// Parse `num/den` or a plain number. A zero denominator falls back to 25 fps.
fn parse_rational(value: &str) -> Result<f64, String> {
    let bad = || format!("invalid frame rate '{}'", value);
    match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| bad())?;
            let den: f64 = den.trim().parse().map_err(|_| bad())?;
            if den == 0.0 {
                Ok(FALLBACK_FRAME_RATE)
            } else {
                Ok(num / den)
            }
        }
        None => value.trim().parse().map_err(|_| bad()),
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError> {
        let shown = file_path.display().to_string();
        if !file_path.is_file() {
            return Err(DomainError::SourceUnreadable(format!(
                "{}: file not found",
                shown
            )));
        }

        debug!(program = %self.program, path = %shown, "Running probe");
        let output = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-show_format"])
            .arg(file_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::SourceUnreadable(format!("{}: failed to run {}: {}", shown, self.program, e))
            })?;

        if !output.status.success() {
            return Err(DomainError::SourceUnreadable(format!(
                "{}: {} exited with {}",
                shown, self.program, output.status
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let info = parse_probe_report(&shown, &json)?;
        info!(
            path = %shown,
            width = info.width,
            height = info.height,
            fps = info.frame_rate,
            duration = info.duration,
            frames = info.frame_count,
            "Media probed"
        );
        Ok(info)
    }
}
