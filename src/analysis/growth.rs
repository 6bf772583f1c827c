//! Growth indicators
//!
//! Compares the average length of the first few entries with the last few
//! and labels overall consistency by entry count.

use crate::analysis::Insight;
use crate::storage::Entry;
use serde::Serialize;

pub const INSUFFICIENT_GROWTH: &str = "成長分析には5つ以上のエントリが必要です";

/// Entries averaged at each end of the history
pub const GROWTH_SAMPLE: usize = 5;

/// More entries than this counts as consistent writing
pub const CONSISTENCY_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthIndicators {
    pub writing_length_trend: LengthTrend,
    pub consistency: Consistency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthTrend {
    pub early_average: f64,
    pub recent_average: f64,
    /// Strictly longer recent entries; equal averages are not growth
    pub improvement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consistency {
    pub total_entries: usize,
    pub writing_consistency: ConsistencyLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConsistencyLabel {
    #[serde(rename = "良好")]
    Good,
    #[serde(rename = "改善の余地あり")]
    RoomForImprovement,
}

impl ConsistencyLabel {
    pub fn for_count(total_entries: usize) -> Self {
        if total_entries > CONSISTENCY_THRESHOLD {
            ConsistencyLabel::Good
        } else {
            ConsistencyLabel::RoomForImprovement
        }
    }
}

impl std::fmt::Display for ConsistencyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyLabel::Good => write!(f, "良好"),
            ConsistencyLabel::RoomForImprovement => write!(f, "改善の余地あり"),
        }
    }
}

fn mean_length(entries: &[Entry]) -> f64 {
    entries.iter().map(|e| e.length as f64).sum::<f64>() / entries.len() as f64
}

pub fn analyze_growth(entries: &[Entry]) -> Insight<GrowthIndicators> {
    if entries.len() < GROWTH_SAMPLE {
        return Insight::insufficient(INSUFFICIENT_GROWTH);
    }

    let early_average = mean_length(&entries[..GROWTH_SAMPLE]);
    let recent_average = mean_length(&entries[entries.len() - GROWTH_SAMPLE..]);

    Insight::Ready(GrowthIndicators {
        writing_length_trend: LengthTrend {
            early_average,
            recent_average,
            improvement: recent_average > early_average,
        },
        consistency: Consistency {
            total_entries: entries.len(),
            writing_consistency: ConsistencyLabel::for_count(entries.len()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{now_local, AnalysisResult};

    fn entries_of_lengths(lengths: &[usize]) -> Vec<Entry> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                Entry::new(
                    i as u64 + 1,
                    "t",
                    "あ".repeat(len),
                    AnalysisResult::default(),
                    now_local(),
                )
            })
            .collect()
    }

    #[test]
    fn test_needs_five_entries() {
        let result = analyze_growth(&entries_of_lengths(&[10, 10, 10, 10]));
        assert_eq!(result.message(), Some(INSUFFICIENT_GROWTH));
    }

    #[test]
    fn test_equal_averages_are_not_improvement() {
        let result = analyze_growth(&entries_of_lengths(&[10, 10, 10, 10, 10]));
        let trend = &result.ready().unwrap().writing_length_trend;
        assert_eq!(trend.early_average, 10.0);
        assert_eq!(trend.recent_average, 10.0);
        assert!(!trend.improvement);
    }

    #[test]
    fn test_sixth_entry_moves_recent_average_only() {
        let result = analyze_growth(&entries_of_lengths(&[10, 10, 10, 10, 10, 50]));
        let trend = &result.ready().unwrap().writing_length_trend;
        assert_eq!(trend.early_average, 10.0);
        assert_eq!(trend.recent_average, 18.0);
        assert!(trend.improvement);
    }

    #[test]
    fn test_longer_recent_entries_improve() {
        let result = analyze_growth(&entries_of_lengths(&[10, 10, 10, 10, 10, 50, 50, 50, 50, 50]));
        let growth = result.ready().unwrap();
        assert_eq!(growth.writing_length_trend.recent_average, 50.0);
        assert!(growth.writing_length_trend.improvement);
        assert_eq!(
            growth.consistency.writing_consistency,
            ConsistencyLabel::RoomForImprovement
        );
    }

    #[test]
    fn test_consistency_threshold_is_exclusive() {
        assert_eq!(ConsistencyLabel::for_count(10), ConsistencyLabel::RoomForImprovement);
        assert_eq!(ConsistencyLabel::for_count(11), ConsistencyLabel::Good);
        assert_eq!(
            serde_json::to_string(&ConsistencyLabel::Good).unwrap(),
            "\"良好\""
        );
    }
}
