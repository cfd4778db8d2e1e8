//! Labeling session tests through the public API.
//!
//! The decoder is replaced by POSIX tools emitting zeroed frames, so these
//! run without ffmpeg.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cyclemark_cli::adapters::JsonSidecarAdapter;
use cyclemark_cli::app::label_interactor::{LabelSession, PlayState, SessionOptions};
use cyclemark_cli::domain::recorder::{ToggleOutcome, UndoOutcome};
use cyclemark_cli::engine::PlaybackEvent;
use cyclemark_cli::ports::{DecodePort, ProbePort, SidecarLoad, SidecarPort};
use cyclemark_cli::*;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::mpsc;

const WIDTH: u32 = 4;
const HEIGHT: u32 = 2;
const FRAME_BYTES: usize = (WIDTH * HEIGHT * 3) as usize;

/// Test utilities for labeling sessions
mod test_utils {
    use super::*;

    /// Probe that reports a fixed 25 fps, 20 s stream
    pub struct StaticProbe;

    #[async_trait]
    impl ProbePort for StaticProbe {
        async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError> {
            MediaInfo::new(file_path.to_string_lossy(), WIDTH, HEIGHT, 25.0, 20.0)
        }
    }

    /// Seeks yield one frame; streams never end
    pub struct ZeroDecoder;

    impl DecodePort for ZeroDecoder {
        fn seek_command(&self, _file_path: &Path, _at: f64) -> Command {
            let mut command = Command::new("head");
            command.args(["-c", &FRAME_BYTES.to_string(), "/dev/zero"]);
            command
        }

        fn stream_command(&self, _file_path: &Path, _from: f64) -> Command {
            let mut command = Command::new("cat");
            command.arg("/dev/zero");
            command
        }
    }

    /// Label store whose writes always fail
    pub struct ReadOnlySidecar;

    #[async_trait]
    impl SidecarPort for ReadOnlySidecar {
        fn sidecar_path(&self, video_path: &Path) -> PathBuf {
            video_path.with_extension("labels.json")
        }

        async fn save(
            &self,
            video_path: &Path,
            _segments: &[Segment],
            _media: &MediaInfo,
        ) -> Result<PathBuf, DomainError> {
            Err(DomainError::PersistenceWriteFailure {
                path: self.sidecar_path(video_path).display().to_string(),
                message: "read-only file system".to_string(),
            })
        }

        async fn load(&self, _sidecar_path: &Path, _frame_rate: Option<f64>) -> SidecarLoad {
            SidecarLoad::default()
        }
    }

    pub struct Fixture {
        pub dir: TempDir,
        pub video: PathBuf,
        pub sidecar: Arc<JsonSidecarAdapter>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("line3.mp4");
            std::fs::write(&video, b"").unwrap();
            Self {
                dir,
                video,
                sidecar: Arc::new(JsonSidecarAdapter::default()),
            }
        }

        pub fn sidecar_path(&self) -> PathBuf {
            self.sidecar.sidecar_path(&self.video)
        }

        pub async fn open(&self, speed: f64) -> (LabelSession, mpsc::Receiver<PlaybackEvent>) {
            self.open_with(self.sidecar.clone(), speed).await
        }

        pub async fn open_with(
            &self,
            sidecar: Arc<dyn SidecarPort>,
            speed: f64,
        ) -> (LabelSession, mpsc::Receiver<PlaybackEvent>) {
            let (tx, rx) = mpsc::channel(256);
            let session = LabelSession::open(
                Arc::new(StaticProbe),
                Arc::new(ZeroDecoder),
                sidecar,
                &self.video,
                SessionOptions {
                    speed,
                    ..SessionOptions::default()
                },
                tx,
            )
            .await
            .unwrap();
            (session, rx)
        }
    }
}

use test_utils::{Fixture, ReadOnlySidecar};

#[tokio::test]
async fn test_label_segment_by_seeking() {
    let fixture = Fixture::new();
    let (mut session, _events) = fixture.open(1.0).await;
    assert_eq!(session.current_frame().await, 0);

    let opened = session.toggle(Category::ValueAdding).await.unwrap();
    assert!(matches!(opened.outcome, ToggleOutcome::Opened(_)));
    assert!(opened.save.is_none());
    assert!(!fixture.sidecar_path().exists());

    let seek = session.seek_to_frame(250).await.unwrap();
    assert_eq!(seek.frame_index, 250);
    assert!(!seek.resumed);

    let closed = session.toggle(Category::ValueAdding).await.unwrap();
    match &closed.outcome {
        ToggleOutcome::Closed(segment) => {
            assert_eq!(segment.start_frame(), 0);
            assert_eq!(segment.end_frame(), 250);
            assert!((segment.duration_seconds() - 10.0).abs() < 1e-9);
        }
        other => panic!("expected a closed segment, got {:?}", other),
    }
    let saved = closed.save.unwrap().unwrap();
    assert_eq!(saved, fixture.sidecar_path());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(json["video_file"], "line3.mp4");
    assert_eq!(json["labels"][0]["label"], "katma_degerli_is");
    assert_eq!(json["labels"][0]["end_frame"], 250);
    assert_eq!(json["cycle_time_analysis"], serde_json::json!({}));

    session.close().await;
}

#[tokio::test]
async fn test_undo_saves_and_rejections_leave_state() {
    let fixture = Fixture::new();
    let (mut session, _events) = fixture.open(1.0).await;

    session.seek_to_frame(100).await.unwrap();
    session.toggle(Category::Other).await.unwrap();

    let err = session.toggle(Category::ValueAdding).await.unwrap_err();
    assert!(matches!(err, DomainError::SegmentAlreadyOpen { .. }));

    session.seek_to_frame(50).await.unwrap();
    let err = session.toggle(Category::Other).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidSegment {
            start_frame: 100,
            end_frame: 50
        }
    );
    assert!(session.segments().is_empty());
    assert_eq!(session.open_segment().map(|o| o.start_frame), Some(100));

    session.seek_to_frame(175).await.unwrap();
    session.toggle(Category::Other).await.unwrap();
    assert_eq!(session.segments().len(), 1);

    let undone = session.undo().await.unwrap();
    assert!(matches!(undone.outcome, UndoOutcome::RemovedSegment(_)));
    assert!(undone.save.unwrap().is_ok());
    assert!(session.segments().is_empty());
    assert!(session.open_segment().is_none());

    let stored = fixture.sidecar.load(&fixture.sidecar_path(), Some(25.0)).await;
    assert!(stored.segments.is_empty());
    assert!(stored.warnings.is_empty());

    assert!(matches!(
        session.undo().await.unwrap().outcome,
        UndoOutcome::Nothing
    ));
    session.close().await;
}

#[tokio::test]
async fn test_relative_seeks_clamp_to_stream() {
    let fixture = Fixture::new();
    let (mut session, _events) = fixture.open(1.0).await;

    let seek = session.seek_relative(-5.0).await.unwrap();
    assert_eq!(seek.frame_index, 0);

    let seek = session.seek_relative(2.99).await.unwrap();
    assert_eq!(seek.frame_index, 74);

    let seek = session.seek_to_time(60.0).await.unwrap();
    assert!(seek.position <= 19.9 + 1e-9);

    let err = session.jump_to_segment(1).await.unwrap_err();
    assert!(matches!(err, DomainError::BadArgs(_)));
    session.close().await;
}

#[tokio::test]
async fn test_seek_while_playing_restarts_stream() {
    let fixture = Fixture::new();
    let (mut session, mut events) = fixture.open(0.25).await;

    let state = session.toggle_play().await.unwrap();
    assert_eq!(state, PlayState::Playing { from: 0.0 });
    assert!(matches!(events.recv().await, Some(PlaybackEvent::Frame { .. })));

    let seek = session.seek_to_frame(100).await.unwrap();
    assert!(seek.resumed);
    assert!(session.is_playing());
    assert!(seek.position >= 4.0 && seek.position < 5.0);

    match session.toggle_play().await.unwrap() {
        PlayState::Paused { at } => assert!(at >= 4.0),
        other => panic!("expected pause, got {:?}", other),
    }
    assert!(!session.is_playing());
    session.close().await;
}

#[tokio::test]
async fn test_reopen_restores_labels_and_close_is_terminal() {
    let fixture = Fixture::new();
    {
        let (mut session, _events) = fixture.open(1.0).await;
        for (start, end) in [(0, 100), (200, 300)] {
            session.seek_to_frame(start).await.unwrap();
            session.toggle(Category::ValueAdding).await.unwrap();
            session.seek_to_frame(end).await.unwrap();
            session.toggle(Category::ValueAdding).await.unwrap();
        }
        assert_eq!(session.segments().len(), 2);
        let flushed = session.close().await;
        assert!(matches!(flushed, Some(Ok(_))));
        assert!(session.close().await.is_none());
        assert_eq!(
            session.toggle(Category::Other).await.unwrap_err(),
            DomainError::SourceReleased
        );
    }

    let (mut session, _events) = fixture.open(1.0).await;
    assert!(session.load_warnings().is_empty());
    assert_eq!(session.segments().len(), 2);
    let seek = session.jump_to_segment(2).await.unwrap();
    assert_eq!(seek.frame_index, 200);
    let cycles = session.cycle_report().unwrap();
    assert_eq!(cycles.cycle_times, vec![8.0]);
    session.close().await;

    assert!(fixture.dir.path().join("line3.mp4.labels.json").exists());
}

#[tokio::test]
async fn test_undo_after_close_keeps_saved_labels() {
    let fixture = Fixture::new();
    let (mut session, _events) = fixture.open(1.0).await;
    session.toggle(Category::ValueAdding).await.unwrap();
    session.seek_to_frame(50).await.unwrap();
    session.toggle(Category::ValueAdding).await.unwrap();
    session.close().await;

    assert_eq!(session.undo().await.unwrap_err(), DomainError::SourceReleased);
    assert_eq!(session.save().await.unwrap_err(), DomainError::SourceReleased);
    assert_eq!(session.segments().len(), 1);

    let stored = fixture.sidecar.load(&fixture.sidecar_path(), Some(25.0)).await;
    assert_eq!(stored.segments.len(), 1);
    assert_eq!(stored.segments[0].end_frame(), 50);
}

#[tokio::test]
async fn test_failed_save_keeps_labels_in_memory() {
    let fixture = Fixture::new();
    let (mut session, _events) = fixture.open_with(Arc::new(ReadOnlySidecar), 1.0).await;

    session.toggle(Category::Other).await.unwrap();
    session.seek_to_frame(125).await.unwrap();
    let closed = session.toggle(Category::Other).await.unwrap();

    assert!(matches!(closed.outcome, ToggleOutcome::Closed(_)));
    assert!(matches!(
        closed.save,
        Some(Err(DomainError::PersistenceWriteFailure { .. }))
    ));
    assert_eq!(session.segments().len(), 1);
    assert_eq!(session.segments()[0].end_frame(), 125);
    assert!(session.open_segment().is_none());

    // labels stay usable and the close flush reports the same failure
    assert_eq!(session.summary().segment_count, 1);
    assert!(matches!(session.close().await, Some(Err(_))));
    assert!(!fixture.sidecar_path().exists());
}
