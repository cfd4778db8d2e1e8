//! Tabular export, one row per segment in insertion order

use std::path::Path;

use crate::domain::errors::DomainError;
use crate::domain::model::Segment;
use crate::output::writer::OutputWriter;

pub const CSV_HEADER: &str =
    "video_file,start_time,end_time,start_str,end_str,label,label_display,duration_sec";

/// CSV exporter
pub struct CsvExporter {
    writer: OutputWriter,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    /// Render the export
    pub fn render(&self, video_file: &str, segments: &[Segment]) -> String {
        let mut out = String::with_capacity(64 * (segments.len() + 1));
        out.push_str(CSV_HEADER);
        out.push('\n');

        for segment in segments {
            let category = segment.category();
            let fields = [
                escape(video_file),
                format!("{:.2}", segment.start_seconds()),
                format!("{:.2}", segment.end_seconds()),
                segment.start_str(),
                segment.end_str(),
                category.key().to_string(),
                escape(category.display_name()),
                format!("{:.2}", segment.duration_seconds()),
            ];
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    /// Render and write to `path`
    pub fn export(
        &self,
        path: &Path,
        video_file: &str,
        segments: &[Segment],
    ) -> Result<(), DomainError> {
        self.writer
            .write_atomic(path, self.render(video_file, segments).as_bytes())
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote a field holding a separator, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
