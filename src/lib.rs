//! CycleMark time study library
//!
//! Label segments of long fixed-frame-rate videos as value-adding work or
//! other activity, keep the labels in a JSON file next to the video, and
//! derive cycle-time statistics, CSV exports and text reports from them.
//! Frames are decoded by an external `ffmpeg` process and media is probed
//! with `ffprobe`.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use config::StudyConfig;
pub use domain::cycle::{CycleAnalyzer, CycleReport, StudySummary};
pub use domain::errors::DomainError;
pub use domain::model::{Category, Frame, MediaInfo, OpenSegment, Segment};
pub use domain::recorder::SegmentRecorder;
