// Inspect interactor - Orchestrates media file inspection use case

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Output format for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectFormat {
    Text,
    Json,
    Yaml,
}

impl InspectFormat {
    /// Parse format from string
    pub fn parse(format: &str) -> Result<Self, DomainError> {
        match format.to_lowercase().as_str() {
            "text" => Ok(InspectFormat::Text),
            "json" => Ok(InspectFormat::Json),
            "yaml" | "yml" => Ok(InspectFormat::Yaml),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid format: {}. Must be 'text', 'json', or 'yaml'",
                format
            ))),
        }
    }
}

/// Response from media file inspection
#[derive(Debug, Clone)]
pub struct InspectResponse {
    pub media_info: MediaInfo,
    pub summary: String,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Execute media file inspection
    pub async fn execute(
        &self,
        input: &Path,
        format: InspectFormat,
    ) -> Result<InspectResponse, DomainError> {
        info!("Starting media file inspection for: {}", input.display());

        let media_info = self.probe_port.probe_media(input).await?;
        let summary = Self::render(&media_info, format)?;

        info!("Media file inspection completed successfully");
        Ok(InspectResponse {
            media_info,
            summary,
        })
    }

    /// Render media info in the requested format
    pub fn render(media_info: &MediaInfo, format: InspectFormat) -> Result<String, DomainError> {
        match format {
            InspectFormat::Json => serde_json::to_string_pretty(media_info)
                .map_err(|e| DomainError::BadArgs(format!("JSON serialization failed: {}", e))),
            InspectFormat::Yaml => serde_yaml::to_string(media_info)
                .map_err(|e| DomainError::BadArgs(format!("YAML serialization failed: {}", e))),
            InspectFormat::Text => Ok(Self::format_as_text(media_info)),
        }
    }

    /// Format media info as human-readable text
    fn format_as_text(media_info: &MediaInfo) -> String {
        let mut output = String::new();
        output.push_str("Media File Information:\n");
        output.push_str(&format!("  File: {}\n", media_info.path));
        output.push_str(&format!(
            "  Codec: {}\n",
            media_info.codec.as_deref().unwrap_or("unknown")
        ));
        output.push_str(&format!(
            "  Resolution: {}x{}\n",
            media_info.width, media_info.height
        ));
        output.push_str(&format!("  Frame Rate: {:.3} fps\n", media_info.frame_rate));
        output.push_str(&format!(
            "  Duration: {:.3}s ({})\n",
            media_info.duration,
            format_clock(media_info.duration)
        ));
        output.push_str(&format!("  Frames (estimated): {}\n", media_info.frame_count));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticProbe;

    #[async_trait]
    impl ProbePort for StaticProbe {
        async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError> {
            Ok(MediaInfo::new(file_path.display().to_string(), 1280, 720, 25.0, 90.0)?
                .with_codec("hevc"))
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(InspectFormat::parse("JSON").unwrap(), InspectFormat::Json);
        assert_eq!(InspectFormat::parse("yml").unwrap(), InspectFormat::Yaml);
        assert!(InspectFormat::parse("xml").is_err());
    }

    #[tokio::test]
    async fn test_text_summary() {
        let interactor = InspectInteractor::new(Arc::new(StaticProbe));
        let response = interactor
            .execute(Path::new("cam.mp4"), InspectFormat::Text)
            .await
            .unwrap();
        assert!(response.summary.contains("Resolution: 1280x720"));
        assert!(response.summary.contains("Duration: 90.000s (01:30)"));
        assert!(response.summary.contains("Frames (estimated): 2250"));
        assert!(response.summary.contains("Codec: hevc"));
    }

    #[tokio::test]
    async fn test_json_summary_parses_back() {
        let interactor = InspectInteractor::new(Arc::new(StaticProbe));
        let response = interactor
            .execute(Path::new("cam.mp4"), InspectFormat::Json)
            .await
            .unwrap();
        let parsed: MediaInfo = serde_json::from_str(&response.summary).unwrap();
        assert_eq!(parsed, response.media_info);
    }
}
