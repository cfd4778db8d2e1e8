// Cycle analysis - Derived statistics over the closed segment list

use std::cmp::Ordering;

use crate::domain::model::*;

/// Cycle-time statistics for the value-adding category.
///
/// Only produced when at least two value-adding segments exist.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// `start(i) - start(i-1)` over value-adding segments sorted by start
    pub cycle_times: Vec<f64>,
    /// Start time of each cycle, i.e. the earlier segment of each pair
    pub cycle_starts: Vec<f64>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Mean duration over all value-adding segments
    pub average_value_adding_duration: f64,
    /// `average_value_adding_duration / average * 100`; absent when the average cycle is zero
    pub efficiency_pct: Option<f64>,
}

impl CycleReport {
    /// Number of cycles
    pub fn count(&self) -> usize {
        self.cycle_times.len()
    }
}

/// Pure cycle-time computation, recomputed on every query
pub struct CycleAnalyzer;

impl CycleAnalyzer {
    /// Compute cycle statistics. Independent of the input order.
    pub fn compute(segments: &[Segment]) -> Option<CycleReport> {
        let sorted = Self::value_adding_by_start(segments);
        if sorted.len() < 2 {
            return None;
        }

        let cycle_times: Vec<f64> = sorted
            .windows(2)
            .map(|pair| pair[1].start_seconds() - pair[0].start_seconds())
            .collect();
        let cycle_starts: Vec<f64> = sorted[..sorted.len() - 1]
            .iter()
            .map(|segment| segment.start_seconds())
            .collect();

        let average = cycle_times.iter().sum::<f64>() / cycle_times.len() as f64;
        let min = cycle_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = cycle_times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average_value_adding_duration = sorted
            .iter()
            .map(|segment| segment.duration_seconds())
            .sum::<f64>()
            / sorted.len() as f64;
        let efficiency_pct =
            (average > 0.0).then(|| average_value_adding_duration / average * 100.0);

        Some(CycleReport {
            cycle_times,
            cycle_starts,
            average,
            min,
            max,
            average_value_adding_duration,
            efficiency_pct,
        })
    }

    /// Value-adding segments ordered by start, ties broken by end
    pub fn value_adding_by_start(segments: &[Segment]) -> Vec<&Segment> {
        let mut value_adding: Vec<&Segment> = segments
            .iter()
            .filter(|segment| segment.category() == Category::ValueAdding)
            .collect();
        value_adding.sort_by(|a, b| compare_by_time(a, b));
        value_adding
    }
}

fn compare_by_time(a: &Segment, b: &Segment) -> Ordering {
    a.start_seconds()
        .total_cmp(&b.start_seconds())
        .then_with(|| a.end_seconds().total_cmp(&b.end_seconds()))
}

/// Count and durations for one category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    pub count: usize,
    pub total_seconds: f64,
}

impl CategoryTotals {
    /// Mean duration, zero when empty
    pub fn average_seconds(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_seconds / self.count as f64
        }
    }
}

/// Totals and coverage over the whole segment list
#[derive(Debug, Clone, PartialEq)]
pub struct StudySummary {
    pub segment_count: usize,
    pub value_adding: CategoryTotals,
    pub other: CategoryTotals,
    pub video_duration: f64,
}

impl StudySummary {
    /// Summarize segments against the video's total duration
    pub fn compute(segments: &[Segment], video_duration: f64) -> Self {
        let mut value_adding = CategoryTotals::default();
        let mut other = CategoryTotals::default();

        let mut ordered: Vec<&Segment> = segments.iter().collect();
        ordered.sort_by(|a, b| compare_by_time(a, b));
        for segment in ordered {
            let totals = match segment.category() {
                Category::ValueAdding => &mut value_adding,
                Category::Other => &mut other,
            };
            totals.count += 1;
            totals.total_seconds += segment.duration_seconds();
        }

        Self {
            segment_count: segments.len(),
            value_adding,
            other,
            video_duration,
        }
    }

    /// Labeled time across both categories
    pub fn labeled_seconds(&self) -> f64 {
        self.value_adding.total_seconds + self.other.total_seconds
    }

    /// Labeled share of the video, absent for a zero-length video
    pub fn coverage_pct(&self) -> Option<f64> {
        (self.video_duration > 0.0).then(|| self.labeled_seconds() / self.video_duration * 100.0)
    }

    /// Share of labeled time for a category, absent when nothing is labeled
    pub fn share_pct(&self, category: Category) -> Option<f64> {
        let labeled = self.labeled_seconds();
        let totals = match category {
            Category::ValueAdding => &self.value_adding,
            Category::Other => &self.other,
        };
        (labeled > 0.0).then(|| totals.total_seconds / labeled * 100.0)
    }
}

#[cfg(test)]
mod tests;
