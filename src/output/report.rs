//! Human-readable time study report

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::domain::cycle::{CategoryTotals, CycleAnalyzer, CycleReport, StudySummary};
use crate::domain::errors::DomainError;
use crate::domain::model::{format_clock, Category, Segment};
use crate::output::writer::OutputWriter;

const WIDTH: usize = 60;

/// Report generator
pub struct ReportWriter {
    writer: OutputWriter,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    /// Render the full report as of `now`
    pub fn render(
        &self,
        video_file: &str,
        segments: &[Segment],
        video_duration: f64,
        now: DateTime<Local>,
    ) -> String {
        let summary = StudySummary::compute(segments, video_duration);
        let rule = "-".repeat(WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{}", "=".repeat(WIDTH));
        let _ = writeln!(out, "  TIME STUDY REPORT");
        let _ = writeln!(out, "{}", "=".repeat(WIDTH));
        let _ = writeln!(out);
        let _ = writeln!(out, "Video          : {}", video_file);
        let _ = writeln!(out, "Date           : {}", now.format("%Y-%m-%d %H:%M"));
        let _ = writeln!(out, "Video Duration : {}", format_clock(video_duration));
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "SUMMARY");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Total Labels         : {}", summary.segment_count);
        let _ = writeln!(out, "Labeled Time         : {}", format_clock(summary.labeled_seconds()));
        let _ = writeln!(out, "Coverage             : {}", percent(summary.coverage_pct()));
        let _ = writeln!(out);

        for category in [Category::ValueAdding, Category::Other] {
            let totals = match category {
                Category::ValueAdding => &summary.value_adding,
                Category::Other => &summary.other,
            };
            write_category(&mut out, category, totals, summary.share_pct(category));
        }

        if let Some(report) = CycleAnalyzer::compute(segments) {
            let _ = writeln!(out, "{}", rule);
            let _ = writeln!(out, "CYCLE TIME ANALYSIS");
            let _ = writeln!(out, "{}", rule);
            let _ = writeln!(out, "  Cycle Count        : {}", report.count());
            let _ = writeln!(out, "  Average Cycle      : {}", format_clock(report.average));
            let _ = writeln!(out, "  Minimum Cycle      : {}", format_clock(report.min));
            let _ = writeln!(out, "  Maximum Cycle      : {}", format_clock(report.max));
            let _ = writeln!(
                out,
                "  Avg. Value-Adding  : {}",
                format_clock(report.average_value_adding_duration)
            );
            let _ = writeln!(out, "  Efficiency         : {}", percent(report.efficiency_pct));
            let _ = writeln!(out);
            let _ = writeln!(out, "  {:>4}  {:>12}  {:>14}", "#", "Cycle Start", "Cycle Time");
            let _ = writeln!(out, "  {}", "-".repeat(35));
            for (i, (start, time)) in report
                .cycle_starts
                .iter()
                .zip(&report.cycle_times)
                .enumerate()
            {
                let _ = writeln!(
                    out,
                    "  {:>4}  {:>12}  {:>14}",
                    i + 1,
                    format_clock(*start),
                    format_clock(*time)
                );
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "DETAILED LABEL LIST");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:>4}  {:>10}  {:>10}  {:>8}  Label", "#", "Start", "End", "Duration");
        let _ = writeln!(out, "{}", rule);
        for (i, segment) in segments.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}  {:>10}  {:>10}  {:>8}  {}",
                i + 1,
                segment.start_str(),
                segment.end_str(),
                format_clock(segment.duration_seconds()),
                segment.category().display_name()
            );
        }
        out
    }

    /// Render and write to `path`
    pub fn export(
        &self,
        path: &Path,
        video_file: &str,
        segments: &[Segment],
        video_duration: f64,
    ) -> Result<(), DomainError> {
        let text = self.render(video_file, segments, video_duration, Local::now());
        self.writer.write_atomic(path, text.as_bytes())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short statistics block for the console
pub fn render_stats(summary: &StudySummary, cycles: Option<&CycleReport>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total labels     : {}", summary.segment_count);
    for category in [Category::ValueAdding, Category::Other] {
        let totals = match category {
            Category::ValueAdding => &summary.value_adding,
            Category::Other => &summary.other,
        };
        let _ = writeln!(
            out,
            "{:<17}: {} x, total {}, avg {}, share {}",
            category.display_name(),
            totals.count,
            format_clock(totals.total_seconds),
            format_clock(totals.average_seconds()),
            percent(summary.share_pct(category))
        );
    }
    let _ = writeln!(out, "Labeled time     : {}", format_clock(summary.labeled_seconds()));
    let _ = writeln!(out, "Coverage         : {}", percent(summary.coverage_pct()));

    match cycles {
        Some(report) => {
            let _ = writeln!(out, "Cycles           : {}", report.count());
            let _ = writeln!(
                out,
                "Cycle time       : avg {}, min {}, max {}",
                format_clock(report.average),
                format_clock(report.min),
                format_clock(report.max)
            );
            let _ = writeln!(out, "Efficiency       : {}", percent(report.efficiency_pct));
        }
        None => {
            let _ = writeln!(out, "Cycles           : need at least 2 value-adding labels");
        }
    }
    out
}

fn write_category(out: &mut String, category: Category, totals: &CategoryTotals, share: Option<f64>) {
    let _ = writeln!(out, "{}", category.display_name().to_uppercase());
    let _ = writeln!(out, "  Count              : {}", totals.count);
    let _ = writeln!(out, "  Total Time         : {}", format_clock(totals.total_seconds));
    let _ = writeln!(out, "  Average Time       : {}", format_clock(totals.average_seconds()));
    if share.is_some() {
        let _ = writeln!(out, "  Share (labeled)    : {}", percent(share));
    }
    let _ = writeln!(out);
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}%", value),
        None => "n/a".to_string(),
    }
}
