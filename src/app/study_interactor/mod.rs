// Study interactor - Statistics, exports and listings from saved labels

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::cycle::{CycleAnalyzer, CycleReport, StudySummary};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::output::{CsvExporter, ReportWriter};
use crate::ports::*;
use crate::utils::PathUtils;

/// Which derived files to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Report,
    All,
}

impl ExportKind {
    /// Parse export kind from string
    pub fn parse(kind: &str) -> Result<Self, DomainError> {
        match kind.to_lowercase().as_str() {
            "csv" => Ok(ExportKind::Csv),
            "report" => Ok(ExportKind::Report),
            "all" => Ok(ExportKind::All),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid export kind: {}. Must be 'csv', 'report', or 'all'",
                kind
            ))),
        }
    }
}

/// Labels of one video as read from its label file
#[derive(Debug, Clone)]
pub struct StudySnapshot {
    pub video_path: PathBuf,
    pub video_file: String,
    pub segments: Vec<Segment>,
    pub frame_rate: f64,
    pub frame_count: u64,
    pub duration: f64,
    pub warnings: Vec<String>,
}

impl StudySnapshot {
    pub fn summary(&self) -> StudySummary {
        StudySummary::compute(&self.segments, self.duration)
    }

    pub fn cycle_report(&self) -> Option<CycleReport> {
        CycleAnalyzer::compute(&self.segments)
    }
}

/// A video found by a listing
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// `None` when the video has no label file yet
    pub label_count: Option<usize>,
}

/// Interactor for offline study use cases
pub struct StudyInteractor {
    sidecar: Arc<dyn SidecarPort>,
    csv_suffix: String,
    report_suffix: String,
    paths: PathUtils,
}

impl StudyInteractor {
    /// Create new study interactor with injected ports
    pub fn new(
        sidecar: Arc<dyn SidecarPort>,
        csv_suffix: impl Into<String>,
        report_suffix: impl Into<String>,
    ) -> Self {
        Self {
            sidecar,
            csv_suffix: csv_suffix.into(),
            report_suffix: report_suffix.into(),
            paths: PathUtils::new(),
        }
    }

    pub fn csv_path(&self, video_path: &Path) -> PathBuf {
        self.paths.with_suffix(video_path, &self.csv_suffix)
    }

    pub fn report_path(&self, video_path: &Path) -> PathBuf {
        self.paths.with_suffix(video_path, &self.report_suffix)
    }

    /// Read a video's labels using only the stream facts stored with them
    pub async fn load(&self, video_path: &Path) -> Result<StudySnapshot, DomainError> {
        let sidecar_path = self.sidecar.sidecar_path(video_path);
        let load = self.sidecar.load(&sidecar_path, None).await;

        let recorded = load.recorded.ok_or_else(|| DomainError::PersistenceReadFailure {
            path: sidecar_path.display().to_string(),
            message: load
                .warnings
                .first()
                .cloned()
                .unwrap_or_else(|| "no label file for this video".to_string()),
        })?;

        Ok(StudySnapshot {
            video_path: video_path.to_path_buf(),
            video_file: self.paths.file_name(video_path),
            segments: load.segments,
            frame_rate: recorded.frame_rate,
            frame_count: recorded.frame_count,
            duration: recorded.duration,
            warnings: load.warnings,
        })
    }

    /// Write the requested exports; returns the written paths
    pub fn export(
        &self,
        video_path: &Path,
        segments: &[Segment],
        video_duration: f64,
        kind: ExportKind,
    ) -> Result<Vec<PathBuf>, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::BadArgs(
                "No labels to export".to_string(),
            ));
        }

        let video_file = self.paths.file_name(video_path);
        let mut written = Vec::new();

        if matches!(kind, ExportKind::Csv | ExportKind::All) {
            let path = self.csv_path(video_path);
            CsvExporter::new().export(&path, &video_file, segments)?;
            info!(path = %path.display(), rows = segments.len(), "CSV exported");
            written.push(path);
        }
        if matches!(kind, ExportKind::Report | ExportKind::All) {
            let path = self.report_path(video_path);
            ReportWriter::new().export(&path, &video_file, segments, video_duration)?;
            info!(path = %path.display(), "Report written");
            written.push(path);
        }
        Ok(written)
    }

    /// Videos in `dir` with their label counts
    pub async fn list(&self, dir: &Path) -> Result<Vec<VideoEntry>, DomainError> {
        let mut entries = Vec::new();
        for path in self.paths.list_videos(dir)? {
            let sidecar_path = self.sidecar.sidecar_path(&path);
            let label_count = if sidecar_path.is_file() {
                let load = self.sidecar.load(&sidecar_path, None).await;
                if !load.warnings.is_empty() {
                    warn!(path = %sidecar_path.display(), problems = load.warnings.len(), "Label file has problems");
                }
                Some(load.segments.len())
            } else {
                None
            };
            entries.push(VideoEntry {
                file_name: self.paths.file_name(&path),
                path,
                label_count,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::JsonSidecarAdapter;

    fn interactor() -> StudyInteractor {
        StudyInteractor::new(
            Arc::new(JsonSidecarAdapter::default()),
            ".labels.csv",
            ".report.txt",
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(0, 250, Category::ValueAdding, 25.0).unwrap(),
            Segment::new(2500, 2600, Category::ValueAdding, 25.0).unwrap(),
        ]
    }

    #[test]
    fn test_parse_export_kind() {
        assert_eq!(ExportKind::parse("ALL").unwrap(), ExportKind::All);
        assert!(ExportKind::parse("pdf").is_err());
    }

    #[tokio::test]
    async fn test_load_uses_stored_stream_facts() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("cam.mp4");
        let media = MediaInfo::new("cam.mp4", 640, 480, 25.0, 300.0).unwrap();
        JsonSidecarAdapter::default()
            .save(&video, &segments(), &media)
            .await
            .unwrap();

        let snapshot = interactor().load(&video).await.unwrap();
        assert_eq!(snapshot.segments, segments());
        assert_eq!(snapshot.frame_rate, 25.0);
        assert_eq!(snapshot.frame_count, 7500);
        assert_eq!(snapshot.duration, 300.0);
        assert_eq!(snapshot.cycle_report().unwrap().cycle_times, vec![100.0]);
    }

    #[tokio::test]
    async fn test_load_without_label_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = interactor().load(&dir.path().join("cam.mp4")).await.unwrap_err();
        assert!(matches!(err, DomainError::PersistenceReadFailure { .. }));
    }

    #[test]
    fn test_export_all_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("cam.mp4");
        let written = interactor()
            .export(&video, &segments(), 300.0, ExportKind::All)
            .unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("cam.mp4.labels.csv"),
                dir.path().join("cam.mp4.report.txt")
            ]
        );
        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_export_requires_labels() {
        let dir = tempfile::tempdir().unwrap();
        assert!(interactor()
            .export(&dir.path().join("cam.mp4"), &[], 10.0, ExportKind::Csv)
            .is_err());
    }

    #[tokio::test]
    async fn test_list_counts_labels() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaInfo::new("a.mp4", 640, 480, 25.0, 300.0).unwrap();
        for name in ["a.mp4", "b.mkv"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        JsonSidecarAdapter::default()
            .save(&dir.path().join("a.mp4"), &segments(), &media)
            .await
            .unwrap();

        let entries = interactor().list(dir.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "a.mp4");
        assert_eq!(entries[0].label_count, Some(2));
        assert_eq!(entries[1].label_count, None);
    }
}
