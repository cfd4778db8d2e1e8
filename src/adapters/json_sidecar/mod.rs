//! JSON sidecar adapter
//!
//! One label file per video at `<video path><suffix>`. The `labels` array is
//! the primary data; `cycle_time_analysis` is rewritten on every save and
//! ignored on load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::cycle::{CycleAnalyzer, CycleReport};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::output::writer::OutputWriter;
use crate::ports::*;
use crate::utils::PathUtils;

/// Default label file suffix
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".labels.json";

/// Stored label entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub start_frame: u64,
    pub end_frame: u64,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub start_str: String,
    #[serde(default)]
    pub end_str: String,
    pub label: String,
    #[serde(default)]
    pub duration: f64,
}

impl LabelRecord {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            start_frame: segment.start_frame(),
            end_frame: segment.end_frame(),
            start_time: segment.start_seconds(),
            end_time: segment.end_seconds(),
            start_str: segment.start_str(),
            end_str: segment.end_str(),
            label: segment.category().key().to_string(),
            duration: segment.duration_seconds(),
        }
    }

    /// Rebuild the segment at `frame_rate`
    pub fn to_segment(&self, frame_rate: f64) -> Result<Segment, DomainError> {
        let category = Category::from_key(&self.label)
            .ok_or_else(|| DomainError::BadArgs(format!("unknown label '{}'", self.label)))?;
        Segment::new(self.start_frame, self.end_frame, category, frame_rate)
    }
}

/// Cycle block; serializes as `{}` when no cycles are defined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleTimeAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_times: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cycle_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cycle_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cycle_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_kdi_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_pct: Option<f64>,
}

impl CycleTimeAnalysis {
    pub fn from_report(report: Option<&CycleReport>) -> Self {
        let Some(report) = report else {
            return Self::default();
        };
        Self {
            cycle_count: Some(report.count()),
            cycle_times: Some(report.cycle_times.iter().copied().map(round2).collect()),
            avg_cycle_time: Some(round2(report.average)),
            min_cycle_time: Some(round2(report.min)),
            max_cycle_time: Some(round2(report.max)),
            avg_kdi_duration: Some(round2(report.average_value_adding_duration)),
            efficiency_pct: report.efficiency_pct.map(round2),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Full sidecar document as written
#[derive(Debug, Clone, Serialize)]
pub struct SidecarDocument {
    pub video_file: String,
    pub video_path: String,
    pub fps: f64,
    pub total_frames: u64,
    pub total_duration: f64,
    pub created: String,
    pub cycle_time_analysis: CycleTimeAnalysis,
    pub labels: Vec<LabelRecord>,
}

/// Lenient view used on load; each label is checked on its own
#[derive(Debug, Deserialize)]
struct StoredDocument {
    fps: Option<f64>,
    total_frames: Option<u64>,
    total_duration: Option<f64>,
    #[serde(default)]
    labels: Vec<serde_json::Value>,
}

/// Sidecar persistence as pretty-printed JSON
pub struct JsonSidecarAdapter {
    suffix: String,
    paths: PathUtils,
}

impl JsonSidecarAdapter {
    /// Create new JSON sidecar adapter writing `<video><suffix>`
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            paths: PathUtils::new(),
        }
    }

    /// Build the document for a save
    pub fn document(
        &self,
        video_path: &Path,
        segments: &[Segment],
        media: &MediaInfo,
    ) -> SidecarDocument {
        let report = CycleAnalyzer::compute(segments);
        SidecarDocument {
            video_file: self.paths.file_name(video_path),
            video_path: self.paths.absolute(video_path).to_string_lossy().into_owned(),
            fps: media.frame_rate,
            total_frames: media.frame_count,
            total_duration: media.duration,
            created: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            cycle_time_analysis: CycleTimeAnalysis::from_report(report.as_ref()),
            labels: segments.iter().map(LabelRecord::from_segment).collect(),
        }
    }

    /// Parse sidecar text. Never fails; problems become warnings.
    pub fn parse(&self, json: &str, frame_rate: Option<f64>) -> SidecarLoad {
        let mut load = SidecarLoad::default();

        let stored: StoredDocument = match serde_json::from_str(json) {
            Ok(stored) => stored,
            Err(e) => {
                load.warnings.push(format!("label file is corrupt: {}", e));
                return load;
            }
        };

        let stored_rate = stored.fps.filter(|fps| fps.is_finite() && *fps > 0.0);
        if let Some(fps) = stored_rate {
            load.recorded = Some(RecordedMedia {
                frame_rate: fps,
                frame_count: stored.total_frames.unwrap_or(0),
                duration: stored
                    .total_duration
                    .unwrap_or_else(|| stored.total_frames.unwrap_or(0) as f64 / fps),
            });
        }

        let Some(rate) = frame_rate.or(stored_rate) else {
            if !stored.labels.is_empty() {
                load.warnings
                    .push("label file has no usable fps; labels ignored".to_string());
            }
            return load;
        };

        for (index, value) in stored.labels.into_iter().enumerate() {
            let segment = serde_json::from_value::<LabelRecord>(value)
                .map_err(|e| DomainError::BadArgs(e.to_string()))
                .and_then(|record| record.to_segment(rate));
            match segment {
                Ok(segment) => load.segments.push(segment),
                Err(e) => load
                    .warnings
                    .push(format!("skipped label #{}: {}", index + 1, e)),
            }
        }
        load
    }
}

impl Default for JsonSidecarAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_SIDECAR_SUFFIX)
    }
}

#[async_trait]
impl SidecarPort for JsonSidecarAdapter {
    fn sidecar_path(&self, video_path: &Path) -> PathBuf {
        self.paths.with_suffix(video_path, &self.suffix)
    }

    async fn save(
        &self,
        video_path: &Path,
        segments: &[Segment],
        media: &MediaInfo,
    ) -> Result<PathBuf, DomainError> {
        let path = self.sidecar_path(video_path);
        let write_error = |message: String| DomainError::PersistenceWriteFailure {
            path: path.display().to_string(),
            message,
        };

        let document = self.document(video_path, segments, media);
        let json = serde_json::to_string_pretty(&document).map_err(|e| write_error(e.to_string()))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            OutputWriter::new().write_atomic(&target, json.as_bytes())
        })
        .await
        .map_err(|e| write_error(e.to_string()))??;

        debug!(path = %path.display(), labels = segments.len(), "Labels saved");
        Ok(path)
    }

    async fn load(&self, sidecar_path: &Path, frame_rate: Option<f64>) -> SidecarLoad {
        let json = match tokio::fs::read_to_string(sidecar_path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %sidecar_path.display(), "No label file");
                return SidecarLoad::default();
            }
            Err(e) => {
                let error = DomainError::PersistenceReadFailure {
                    path: sidecar_path.display().to_string(),
                    message: e.to_string(),
                };
                warn!("{}", error);
                return SidecarLoad {
                    warnings: vec![error.to_string()],
                    ..SidecarLoad::default()
                };
            }
        };

        let load = self.parse(&json, frame_rate);
        for warning in &load.warnings {
            warn!(path = %sidecar_path.display(), "{}", warning);
        }
        info!(
            path = %sidecar_path.display(),
            labels = load.segments.len(),
            skipped = load.warnings.len(),
            "Labels loaded"
        );
        load
    }
}
