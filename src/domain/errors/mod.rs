// Domain errors - Error types for the domain layer

use thiserror::Error;

use crate::domain::model::Category;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Media file missing, without a video stream, or the metadata tool failed
    #[error("Source unreadable: {0}")]
    SourceUnreadable(String),

    /// A single-frame seek read produced no usable frame
    #[error("Decode failed at {time:.3}s: {message}")]
    DecodeFailed { time: f64, message: String },

    /// Closing a segment at or before its start frame
    #[error("Invalid segment: end frame {end_frame} must be after start frame {start_frame}")]
    InvalidSegment { start_frame: u64, end_frame: u64 },

    /// A toggle for one category while a segment of the other is open
    #[error("A {open} segment is already open; close it before starting {requested}")]
    SegmentAlreadyOpen { open: Category, requested: Category },

    /// Sidecar missing or corrupt
    #[error("Failed to read label file {path}: {message}")]
    PersistenceReadFailure { path: String, message: String },

    /// Sidecar could not be written
    #[error("Failed to write label file {path}: {message}")]
    PersistenceWriteFailure { path: String, message: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Frame source used after release
    #[error("Frame source has been released")]
    SourceReleased,

    /// Playback requested while already playing
    #[error("Playback is already running")]
    AlreadyPlaying,

    /// External process could not be started or supervised
    #[error("Process error: {0}")]
    ProcessError(String),
}
