// Unit tests for cycle analysis

#[cfg(test)]
mod tests {
    use crate::domain::cycle::*;
    use crate::domain::model::*;

    fn va(start_s: u64, end_s: u64) -> Segment {
        Segment::new(start_s * 25, end_s * 25, Category::ValueAdding, 25.0).unwrap()
    }

    fn other(start_s: u64, end_s: u64) -> Segment {
        Segment::new(start_s * 25, end_s * 25, Category::Other, 25.0).unwrap()
    }

    #[test]
    fn test_two_value_adding_segments_make_one_cycle() {
        let report = CycleAnalyzer::compute(&[va(0, 20), va(100, 130)]).unwrap();
        assert_eq!(report.count(), 1);
        assert_eq!(report.cycle_times, vec![100.0]);
        assert_eq!(report.average, 100.0);
        assert_eq!(report.min, 100.0);
        assert_eq!(report.max, 100.0);
        assert_eq!(report.average_value_adding_duration, 25.0);
        assert_eq!(report.efficiency_pct, Some(25.0));
        assert_eq!(report.cycle_starts, vec![0.0]);
    }

    #[test]
    fn test_fewer_than_two_value_adding_segments_yield_nothing() {
        assert!(CycleAnalyzer::compute(&[]).is_none());
        assert!(CycleAnalyzer::compute(&[va(0, 5)]).is_none());
        assert!(CycleAnalyzer::compute(&[va(0, 5), other(5, 9), other(20, 30), other(40, 41)]).is_none());
    }

    #[test]
    fn test_sorts_by_start_time() {
        // recorded out of time order
        let segments = vec![va(120, 130), other(0, 10), va(0, 10), va(50, 60)];
        let report = CycleAnalyzer::compute(&segments).unwrap();
        assert_eq!(report.cycle_times, vec![50.0, 70.0]);
        assert_eq!(report.min, 50.0);
        assert_eq!(report.max, 70.0);
        assert_eq!(report.average, 60.0);
        assert_eq!(report.cycle_starts, vec![0.0, 50.0]);
    }

    #[test]
    fn test_invariant_under_permutation() {
        let segments = vec![
            va(3, 7),
            other(8, 9),
            va(31, 40),
            va(17, 19),
            other(1, 2),
            va(62, 70),
            va(45, 50),
        ];
        let expected = CycleAnalyzer::compute(&segments);

        let mut rotated = segments.clone();
        for _ in 0..segments.len() {
            rotated.rotate_left(1);
            assert_eq!(CycleAnalyzer::compute(&rotated), expected);
        }
        let mut reversed = segments.clone();
        reversed.reverse();
        assert_eq!(CycleAnalyzer::compute(&reversed), expected);
    }

    #[test]
    fn test_efficiency_absent_when_average_cycle_is_zero() {
        let report = CycleAnalyzer::compute(&[va(10, 20), va(10, 15)]).unwrap();
        assert_eq!(report.cycle_times, vec![0.0]);
        assert_eq!(report.efficiency_pct, None);
    }

    #[test]
    fn test_study_summary_totals() {
        let segments = vec![va(0, 10), other(10, 15), va(20, 40)];
        let summary = StudySummary::compute(&segments, 100.0);

        assert_eq!(summary.segment_count, 3);
        assert_eq!(summary.value_adding.count, 2);
        assert_eq!(summary.value_adding.total_seconds, 30.0);
        assert_eq!(summary.value_adding.average_seconds(), 15.0);
        assert_eq!(summary.other.count, 1);
        assert_eq!(summary.labeled_seconds(), 35.0);
        assert_eq!(summary.coverage_pct(), Some(35.0));
        let share = summary.share_pct(Category::Other).unwrap();
        assert!((share - 100.0 * 5.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_study_summary_empty() {
        let summary = StudySummary::compute(&[], 0.0);
        assert_eq!(summary.labeled_seconds(), 0.0);
        assert_eq!(summary.coverage_pct(), None);
        assert_eq!(summary.share_pct(Category::ValueAdding), None);
        assert_eq!(summary.other.average_seconds(), 0.0);
    }
}
