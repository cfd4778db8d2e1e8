//! Real-time playback scheduler
//!
//! Drives the frame source's streaming mode from a dedicated task, pacing
//! frames to `frame_rate * speed` and publishing each kept frame to a
//! consumer channel. Stopping is cooperative: the loop observes the stop
//! request at the top of each iteration and before publishing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::Frame;
use crate::engine::frame_source::FrameSource;

/// Fastest accepted playback factor
pub const MAX_SPEED: f64 = 16.0;

/// What the playback loop publishes
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A kept frame and the position right after it
    Frame {
        frame: Frame,
        position: f64,
        frame_index: u64,
    },
    /// The stream ran out; playback is stopped
    Ended { position: f64 },
}

/// Check a speed factor against `(0, MAX_SPEED]`
pub fn validate_speed(speed: f64) -> Result<f64, DomainError> {
    if speed.is_finite() && speed > 0.0 && speed <= MAX_SPEED {
        Ok(speed)
    } else {
        Err(DomainError::BadArgs(format!(
            "Playback speed must be in (0, {}], got {}",
            MAX_SPEED, speed
        )))
    }
}

/// Frames discarded before each kept frame
pub fn frames_skipped_per_tick(speed: f64) -> u64 {
    (speed.trunc() as u64).max(1) - 1
}

struct PlaybackRun {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    stop_timeout: Duration,
}

/// `Stopped -> Playing -> Stopped` driver over a shared frame source.
///
/// While playing, only the loop touches the stream. Callers must `stop()`
/// before seeking the source themselves.
pub struct PlaybackScheduler {
    source: Arc<Mutex<FrameSource>>,
    speed_tx: watch::Sender<f64>,
    position_tx: watch::Sender<f64>,
    run: Option<PlaybackRun>,
}

impl PlaybackScheduler {
    pub fn new(source: Arc<Mutex<FrameSource>>, speed: f64) -> Result<Self, DomainError> {
        let speed = validate_speed(speed)?;
        let (speed_tx, _) = watch::channel(speed);
        let (position_tx, _) = watch::channel(0.0);
        Ok(Self {
            source,
            speed_tx,
            position_tx,
            run: None,
        })
    }

    pub fn speed(&self) -> f64 {
        *self.speed_tx.borrow()
    }

    /// Change the speed; a running loop picks it up on its next tick
    pub fn set_speed(&self, speed: f64) -> Result<(), DomainError> {
        let speed = validate_speed(speed)?;
        self.speed_tx.send_replace(speed);
        debug!(speed, "Playback speed set");
        Ok(())
    }

    /// Whether the loop is still running
    pub fn is_playing(&self) -> bool {
        self.run
            .as_ref()
            .map_or(false, |run| !run.handle.is_finished())
    }

    /// Last position published by the loop
    pub fn published_position(&self) -> f64 {
        *self.position_tx.borrow()
    }

    /// Subscribe to published positions
    pub fn subscribe_position(&self) -> watch::Receiver<f64> {
        self.position_tx.subscribe()
    }

    /// Start streaming from the source's current position.
    pub async fn play(&mut self, events: mpsc::Sender<PlaybackEvent>) -> Result<(), DomainError> {
        if self.is_playing() {
            return Err(DomainError::AlreadyPlaying);
        }
        self.reap().await;

        let (frame_rate, stop_timeout) = {
            let mut source = self.source.lock().await;
            let from = source.position();
            source.start_stream(from).await?;
            self.position_tx.send_replace(source.position());
            (source.media_info().frame_rate, source.stop_timeout())
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.source),
            frame_rate,
            self.speed_tx.subscribe(),
            stop_rx,
            events,
            self.position_tx.clone(),
        ));
        info!(from = self.published_position(), speed = self.speed(), "Playback started");
        self.run = Some(PlaybackRun {
            stop_tx,
            handle,
            stop_timeout,
        });
        Ok(())
    }

    /// Request a stop, wait for the loop to exit, then tear the stream down.
    /// Returns the source position. Safe to call when already stopped.
    ///
    /// A loop blocked on a silent decoder is aborted after the source's stop
    /// timeout, and the stream teardown then kills the process.
    pub async fn stop(&mut self) -> f64 {
        if let Some(PlaybackRun {
            stop_tx,
            mut handle,
            stop_timeout,
        }) = self.run.take()
        {
            let _ = stop_tx.send(true);
            match tokio::time::timeout(stop_timeout, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Playback task failed"),
                Err(_) => {
                    warn!(
                        timeout_ms = stop_timeout.as_millis() as u64,
                        "Playback loop did not stop, aborting"
                    );
                    handle.abort();
                    let _ = handle.await;
                }
            }
        }

        let mut source = self.source.lock().await;
        source.stop_stream().await;
        let position = source.position();
        self.position_tx.send_replace(position);
        position
    }

    async fn reap(&mut self) {
        if let Some(run) = self.run.take() {
            if let Err(e) = run.handle.await {
                warn!(error = %e, "Playback task failed");
            }
        }
    }
}

async fn run_loop(
    source: Arc<Mutex<FrameSource>>,
    frame_rate: f64,
    speed_rx: watch::Receiver<f64>,
    mut stop_rx: watch::Receiver<bool>,
    events: mpsc::Sender<PlaybackEvent>,
    position_tx: watch::Sender<f64>,
) {
    let mut published = 0u64;
    loop {
        if *stop_rx.borrow_and_update() {
            debug!(frames = published, "Playback stop observed");
            break;
        }

        let speed = *speed_rx.borrow();
        let started = Instant::now();

        let next = {
            let mut source = source.lock().await;
            let mut kept = None;
            for _ in 0..=frames_skipped_per_tick(speed) {
                kept = source.read_next_frame().await;
                if kept.is_none() {
                    break;
                }
            }
            (kept, source.position(), source.current_frame_index())
        };

        let event = match next {
            (Some(frame), position, frame_index) => PlaybackEvent::Frame {
                frame,
                position,
                frame_index,
            },
            (None, position, _) => {
                if !*stop_rx.borrow() {
                    position_tx.send_replace(position);
                    let _ = events.send(PlaybackEvent::Ended { position }).await;
                    info!(position, frames = published, "Playback reached end of stream");
                }
                break;
            }
        };

        if *stop_rx.borrow() {
            break;
        }
        if let PlaybackEvent::Frame { position, .. } = &event {
            position_tx.send_replace(*position);
        }
        tokio::select! {
            sent = events.send(event) => {
                if sent.is_err() {
                    debug!("Playback consumer gone");
                    break;
                }
            }
            _ = stop_rx.changed() => break,
        }
        published += 1;

        let interval = Duration::from_secs_f64(1.0 / (frame_rate * speed));
        let wait = interval.saturating_sub(started.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
