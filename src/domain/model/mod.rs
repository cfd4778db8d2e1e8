// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Bytes per pixel of the raw `rgb24` frames produced by the decoder
pub const BYTES_PER_PIXEL: usize = 3;

/// Time specification in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Seconds as f64
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string: seconds, MM:SS(.ms) or HH:MM:SS(.ms)
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Time cannot be negative: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let bad = || DomainError::BadArgs(format!("Invalid time format: {}", trimmed));
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes.parse::<u32>().map_err(|_| bad())?;
                let seconds = seconds.parse::<f64>().map_err(|_| bad())?;
                if !(0.0..60.0).contains(&seconds) {
                    return Err(DomainError::BadArgs(
                        "Seconds must be less than 60".to_string(),
                    ));
                }
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours.parse::<u32>().map_err(|_| bad())?;
                let minutes = minutes.parse::<u32>().map_err(|_| bad())?;
                let seconds = seconds.parse::<f64>().map_err(|_| bad())?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs(
                        "Minutes must be less than 60".to_string(),
                    ));
                }
                if !(0.0..60.0).contains(&seconds) {
                    return Err(DomainError::BadArgs(
                        "Seconds must be less than 60".to_string(),
                    ));
                }
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(format!(
                "Invalid time format: {}. Supported formats: seconds (e.g., 123.45), MM:SS (e.g., 02:30), HH:MM:SS (e.g., 01:02:30)",
                trimmed
            ))),
        }
    }

    /// Format as MM:SS, or HH:MM:SS once an hour is reached
    pub fn format_clock(&self) -> String {
        format_clock(self.seconds)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_clock())
    }
}

/// Format seconds as `MM:SS` or `HH:MM:SS`. Negative input clamps to zero.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total % 3600.0) / 60.0).floor() as u64;
    let secs = (total % 60.0).floor() as u64;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Container and stream metadata of a probed video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path the metadata was read from
    pub path: String,
    /// Video codec name as reported by the probe tool
    pub codec: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate, fixed for the whole stream
    pub frame_rate: f64,
    /// Container duration in seconds
    pub duration: f64,
    /// `floor(duration * frame_rate)`; an upper bound, not a decoded count
    pub frame_count: u64,
}

impl MediaInfo {
    /// Create media info with validation and the derived frame count
    pub fn new(
        path: impl Into<String>,
        width: u32,
        height: u32,
        frame_rate: f64,
        duration: f64,
    ) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs(
                "Video dimensions cannot be zero".to_string(),
            ));
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(DomainError::BadArgs(
                "Frame rate must be positive".to_string(),
            ));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::BadArgs(
                "Duration cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            path: path.into(),
            codec: None,
            width,
            height,
            frame_rate,
            duration,
            frame_count: (duration * frame_rate).floor() as u64,
        })
    }

    /// Attach the codec name
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Size in bytes of one raw frame
    pub fn frame_size_bytes(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Duration of one frame in seconds
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.frame_rate
    }

    /// Nearest frame index for a timestamp
    pub fn frame_at(&self, seconds: f64) -> u64 {
        frame_at(seconds, self.frame_rate)
    }

    /// Timestamp of a frame index
    pub fn time_of(&self, frame: u64) -> f64 {
        frame as f64 / self.frame_rate
    }

    /// Last addressable frame index
    pub fn last_frame(&self) -> u64 {
        self.frame_count.saturating_sub(1)
    }
}

/// Nearest frame index for a timestamp at the given rate
pub fn frame_at(seconds: f64, frame_rate: f64) -> u64 {
    let frame = (seconds * frame_rate).round();
    if frame.is_finite() && frame > 0.0 {
        frame as u64
    } else {
        0
    }
}

/// Segment category. Exactly two exist and they are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "katma_degerli_is", alias = "value_adding")]
    ValueAdding,
    #[serde(rename = "diger", alias = "other")]
    Other,
}

impl Category {
    /// Key used in label files and CSV exports
    pub fn key(&self) -> &'static str {
        match self {
            Category::ValueAdding => "katma_degerli_is",
            Category::Other => "diger",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::ValueAdding => "Value-Adding Work",
            Category::Other => "Other",
        }
    }

    /// Parse a stored key or its English alias
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "katma_degerli_is" | "value_adding" => Some(Category::ValueAdding),
            "diger" | "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The single in-progress labeling operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenSegment {
    pub category: Category,
    pub start_frame: u64,
}

impl OpenSegment {
    /// Seconds elapsed since the segment was opened
    pub fn elapsed(&self, current_frame: u64, frame_rate: f64) -> f64 {
        current_frame.saturating_sub(self.start_frame) as f64 / frame_rate
    }
}

/// An immutable closed interval tagged with one category
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start_frame: u64,
    end_frame: u64,
    category: Category,
    frame_rate: f64,
}

impl Segment {
    /// Create a segment; `end_frame` must be strictly after `start_frame`
    pub fn new(
        start_frame: u64,
        end_frame: u64,
        category: Category,
        frame_rate: f64,
    ) -> Result<Self, DomainError> {
        if end_frame <= start_frame {
            return Err(DomainError::InvalidSegment {
                start_frame,
                end_frame,
            });
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(DomainError::BadArgs(
                "Frame rate must be positive".to_string(),
            ));
        }

        Ok(Self {
            start_frame,
            end_frame,
            category,
            frame_rate,
        })
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_frame as f64 / self.frame_rate
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_frame as f64 / self.frame_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.end_frame - self.start_frame) as f64 / self.frame_rate
    }

    pub fn start_str(&self) -> String {
        format_clock(self.start_seconds())
    }

    pub fn end_str(&self) -> String {
        format_clock(self.end_seconds())
    }
}

/// One decoded video frame in raw `rgb24` layout
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap raw pixel bytes; the buffer must hold exactly one frame
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DomainError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(DomainError::BadArgs(format!(
                "Frame buffer has {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// RGB triple at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }
}
