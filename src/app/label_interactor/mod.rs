// Label interactor - Orchestrates an interactive labeling session

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::domain::cycle::{CycleAnalyzer, CycleReport, StudySummary};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::recorder::*;
use crate::engine::frame_source::{FrameSource, FrameSourceOptions};
use crate::engine::playback::{PlaybackEvent, PlaybackScheduler};
use crate::ports::*;

/// Session tuning taken from configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub source: FrameSourceOptions,
    pub speed: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            source: FrameSourceOptions::default(),
            speed: 1.0,
        }
    }
}

/// A successful change plus the outcome of the auto-save it triggered.
///
/// `save` is `None` when the change did not touch the closed-segment list.
/// A failed save never rolls the change back.
#[derive(Debug)]
pub struct Mutation<T> {
    pub outcome: T,
    pub save: Option<Result<PathBuf, DomainError>>,
}

/// Where a seek landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekOutcome {
    pub frame_index: u64,
    pub position: f64,
    /// Playback was running and has been restarted from the new position
    pub resumed: bool,
}

/// Play/pause result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayState {
    Playing { from: f64 },
    Paused { at: f64 },
}

/// One open video with its labels, frame source and playback
pub struct LabelSession {
    video_path: PathBuf,
    media: MediaInfo,
    source: Arc<Mutex<FrameSource>>,
    scheduler: PlaybackScheduler,
    recorder: SegmentRecorder,
    sidecar: Arc<dyn SidecarPort>,
    events: mpsc::Sender<PlaybackEvent>,
    load_warnings: Vec<String>,
    closed: bool,
}

impl LabelSession {
    /// Probe the video, load its labels and decode the first frame.
    ///
    /// Playback frames are published on `events`.
    pub async fn open(
        probe: Arc<dyn ProbePort>,
        decoder: Arc<dyn DecodePort>,
        sidecar: Arc<dyn SidecarPort>,
        video_path: &Path,
        options: SessionOptions,
        events: mpsc::Sender<PlaybackEvent>,
    ) -> Result<Self, DomainError> {
        info!(path = %video_path.display(), "Opening video");
        let media = probe.probe_media(video_path).await?;

        let load = sidecar
            .load(&sidecar.sidecar_path(video_path), Some(media.frame_rate))
            .await;
        let recorder = SegmentRecorder::with_segments(media.frame_rate, load.segments)?;

        let mut source = FrameSource::new(video_path, media.clone(), decoder, options.source);
        if let Err(e) = source.read_frame_at(0.0).await {
            source.release().await;
            return Err(e);
        }

        let source = Arc::new(Mutex::new(source));
        let scheduler = PlaybackScheduler::new(Arc::clone(&source), options.speed)?;

        info!(
            path = %video_path.display(),
            labels = recorder.segments().len(),
            frames = media.frame_count,
            "Video opened"
        );
        Ok(Self {
            video_path: video_path.to_path_buf(),
            media,
            source,
            scheduler,
            recorder,
            sidecar,
            events,
            load_warnings: load.warnings,
            closed: false,
        })
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    pub fn media(&self) -> &MediaInfo {
        &self.media
    }

    /// Problems met while reading the label file
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn segments(&self) -> &[Segment] {
        self.recorder.segments()
    }

    pub fn open_segment(&self) -> Option<&OpenSegment> {
        self.recorder.open_segment()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn speed(&self) -> f64 {
        self.scheduler.speed()
    }

    /// Current position; the published one while playing
    pub async fn position(&self) -> f64 {
        if self.scheduler.is_playing() {
            self.scheduler.published_position()
        } else {
            self.source.lock().await.position()
        }
    }

    /// Nearest frame of the current position
    pub async fn current_frame(&self) -> u64 {
        self.media.frame_at(self.position().await)
    }

    /// Start playback, or pause it when running
    pub async fn toggle_play(&mut self) -> Result<PlayState, DomainError> {
        self.ensure_open()?;
        if self.scheduler.is_playing() {
            let at = self.scheduler.stop().await;
            info!(position = at, "Paused");
            Ok(PlayState::Paused { at })
        } else {
            self.scheduler.play(self.events.clone()).await?;
            Ok(PlayState::Playing {
                from: self.scheduler.published_position(),
            })
        }
    }

    /// Stop playback if running; returns the position
    pub async fn pause(&mut self) -> f64 {
        self.scheduler.stop().await
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), DomainError> {
        self.scheduler.set_speed(speed)
    }

    /// Seek to a frame, clamped to `[0, last frame]`.
    ///
    /// A running playback is stopped first and restarted from the new
    /// position. On a failed decode the position is unchanged, and playback
    /// resumes from there if it was running.
    pub async fn seek_to_frame(&mut self, frame: u64) -> Result<SeekOutcome, DomainError> {
        self.ensure_open()?;
        let target = frame.min(self.media.last_frame());
        let was_playing = self.scheduler.is_playing();
        if was_playing {
            self.scheduler.stop().await;
        }

        let result = self
            .source
            .lock()
            .await
            .read_frame_at(self.media.time_of(target))
            .await;

        if was_playing {
            self.scheduler.play(self.events.clone()).await?;
        }
        result?;

        let position = self.position().await;
        Ok(SeekOutcome {
            frame_index: self.media.frame_at(position),
            position,
            resumed: was_playing,
        })
    }

    /// Move by `trunc(seconds * fps)` frames from the current frame
    pub async fn seek_relative(&mut self, seconds: f64) -> Result<SeekOutcome, DomainError> {
        let delta = (seconds * self.media.frame_rate).trunc() as i64;
        let current = self.current_frame().await as i64;
        let target = current.saturating_add(delta).max(0) as u64;
        self.seek_to_frame(target).await
    }

    /// Seek to an absolute time
    pub async fn seek_to_time(&mut self, seconds: f64) -> Result<SeekOutcome, DomainError> {
        self.seek_to_frame(self.media.frame_at(seconds)).await
    }

    /// Seek to the start of the 1-based segment `number`
    pub async fn jump_to_segment(&mut self, number: usize) -> Result<SeekOutcome, DomainError> {
        let start = number
            .checked_sub(1)
            .and_then(|i| self.recorder.segments().get(i))
            .map(|segment| segment.start_frame())
            .ok_or_else(|| {
                DomainError::BadArgs(format!(
                    "No label #{}; {} recorded",
                    number,
                    self.recorder.segments().len()
                ))
            })?;
        self.seek_to_frame(start).await
    }

    /// Open or close a segment at the current frame. Closing saves.
    pub async fn toggle(&mut self, category: Category) -> Result<Mutation<ToggleOutcome>, DomainError> {
        self.ensure_open()?;
        let frame = self.current_frame().await;
        let outcome = self.recorder.toggle(category, frame)?;

        let save = match &outcome {
            ToggleOutcome::Opened(open) => {
                info!(category = open.category.key(), frame = open.start_frame, "Segment opened");
                None
            }
            ToggleOutcome::Closed(segment) => {
                info!(
                    category = segment.category().key(),
                    start = segment.start_frame(),
                    end = segment.end_frame(),
                    "Segment closed"
                );
                Some(self.save().await)
            }
        };
        Ok(Mutation { outcome, save })
    }

    /// Undo the open segment, else the last closed one. Removing a closed
    /// segment saves. Rejected once the session is closed.
    pub async fn undo(&mut self) -> Result<Mutation<UndoOutcome>, DomainError> {
        self.ensure_open()?;
        let outcome = self.recorder.undo();
        let save = if outcome.changed_segments() {
            Some(self.save().await)
        } else {
            None
        };
        Ok(Mutation { outcome, save })
    }

    /// Write the label file now
    pub async fn save(&self) -> Result<PathBuf, DomainError> {
        self.ensure_open()?;
        let result = self
            .sidecar
            .save(&self.video_path, self.recorder.segments(), &self.media)
            .await;
        if let Err(e) = &result {
            warn!(error = %e, "Auto-save failed; labels kept in memory");
        }
        result
    }

    pub fn cycle_report(&self) -> Option<CycleReport> {
        CycleAnalyzer::compute(self.recorder.segments())
    }

    pub fn summary(&self) -> StudySummary {
        StudySummary::compute(self.recorder.segments(), self.media.duration)
    }

    /// Stop playback, flush labels and release the decoder.
    ///
    /// Labels are written when any exist. Idempotent.
    pub async fn close(&mut self) -> Option<Result<PathBuf, DomainError>> {
        if self.closed {
            return None;
        }
        self.scheduler.stop().await;
        let flushed = if self.recorder.segments().is_empty() {
            None
        } else {
            Some(self.save().await)
        };
        self.source.lock().await.release().await;
        self.closed = true;
        info!(path = %self.video_path.display(), "Video closed");
        flushed
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.closed {
            Err(DomainError::SourceReleased)
        } else {
            Ok(())
        }
    }
}
