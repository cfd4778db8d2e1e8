//! Frame delivery engine
//!
//! [`frame_source::FrameSource`] owns the external decoder process and the
//! current position; [`playback::PlaybackScheduler`] drives it at real-time
//! pace from its own task.

pub mod frame_source;
pub mod playback;

#[cfg(all(test, unix))]
pub(crate) mod testing;

pub use frame_source::{FrameSource, FrameSourceOptions, SourceMode};
pub use playback::{PlaybackEvent, PlaybackScheduler};
