use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter, JsonSidecarAdapter};
use crate::app::{
    inspect_interactor::InspectInteractor,
    label_interactor::{LabelSession, SessionOptions},
    study_interactor::StudyInteractor,
};
use crate::config::StudyConfig;
use crate::domain::errors::DomainError;
use crate::engine::playback::PlaybackEvent;
use crate::ports::{DecodePort, ProbePort, SidecarPort};

pub trait AppContainer: Send + Sync {
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn study_interactor(&self) -> Arc<StudyInteractor>;
}

pub struct DefaultAppContainer {
    probe_port: Arc<dyn ProbePort>,
    decode_port: Arc<dyn DecodePort>,
    sidecar_port: Arc<dyn SidecarPort>,
    session_options: SessionOptions,
    inspect_interactor: Arc<InspectInteractor>,
    study_interactor: Arc<StudyInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &StudyConfig) -> Self {
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(config.tools.ffprobe.clone()));
        let decode_port: Arc<dyn DecodePort> = Arc::new(FFmpegAdapter::new(config.tools.ffmpeg.clone()));
        let sidecar_port: Arc<dyn SidecarPort> = Arc::new(JsonSidecarAdapter::new(
            config.storage.sidecar_suffix.clone(),
        ));

        Self::with_ports(probe_port, decode_port, sidecar_port, config)
    }

    /// Wire the interactors around explicit ports
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        decode_port: Arc<dyn DecodePort>,
        sidecar_port: Arc<dyn SidecarPort>,
        config: &StudyConfig,
    ) -> Self {
        let inspect_interactor = Arc::new(InspectInteractor::new(Arc::clone(&probe_port)));
        let study_interactor = Arc::new(StudyInteractor::new(
            Arc::clone(&sidecar_port),
            config.storage.csv_suffix.clone(),
            config.storage.report_suffix.clone(),
        ));

        Self {
            probe_port,
            decode_port,
            sidecar_port,
            session_options: SessionOptions {
                source: config.playback.frame_source_options(),
                speed: config.playback.speed,
            },
            inspect_interactor,
            study_interactor,
        }
    }

    /// Open a labeling session for a video
    pub async fn open_session(
        &self,
        video_path: &Path,
        events: mpsc::Sender<PlaybackEvent>,
    ) -> Result<LabelSession, DomainError> {
        LabelSession::open(
            Arc::clone(&self.probe_port),
            Arc::clone(&self.decode_port),
            Arc::clone(&self.sidecar_port),
            video_path,
            self.session_options.clone(),
            events,
        )
        .await
    }
}

impl AppContainer for DefaultAppContainer {
    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn study_interactor(&self) -> Arc<StudyInteractor> {
        Arc::clone(&self.study_interactor)
    }
}
