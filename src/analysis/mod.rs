//! Pattern Analysis
//!
//! Pure, stateless statistics over a snapshot of diary entries.
//!
//! ## Analyses
//!
//! - **frequency**: distinct writing days vs. the covered period
//! - **themes**: most frequent long-ish words (heuristic, not NLP)
//! - **mood**: distribution of `overall_mood` values
//! - **growth**: early vs. recent entry length, consistency label
//!
//! Each analysis that needs a minimum amount of data returns
//! [`Insight::Insufficient`] with a displayable message instead of failing.

pub mod frequency;
pub mod growth;
pub mod mood;
pub mod themes;

pub use frequency::{analyze_frequency, WritingFrequency};
pub use growth::{analyze_growth, Consistency, ConsistencyLabel, GrowthIndicators, LengthTrend};
pub use mood::{analyze_mood_patterns, tally_moods, MoodDistribution, MoodPatterns};
pub use themes::analyze_themes;

use crate::storage::Entry;
use serde::Serialize;

pub const INSUFFICIENT_HISTORY: &str = "分析に十分なデータがありません";

/// Result of an analysis that may lack enough data
///
/// Serializes as the bare result, or as `{"message": ...}` when
/// insufficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Insight<T> {
    Ready(T),
    Insufficient { message: String },
}

impl<T> Insight<T> {
    pub fn insufficient(message: impl Into<String>) -> Self {
        Insight::Insufficient {
            message: message.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Insight::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Insight::Ready(value) => Some(value),
            Insight::Insufficient { .. } => None,
        }
    }

    /// Explanatory message when there was not enough data
    pub fn message(&self) -> Option<&str> {
        match self {
            Insight::Ready(_) => None,
            Insight::Insufficient { message } => Some(message),
        }
    }
}

/// All four analyses over one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub writing_frequency: Insight<WritingFrequency>,
    pub common_themes: Vec<String>,
    pub mood_patterns: Insight<MoodPatterns>,
    pub growth_indicators: Insight<GrowthIndicators>,
}

/// Run every analysis; an empty history is itself insufficient
pub fn analyze_patterns(entries: &[Entry]) -> Insight<PatternReport> {
    if entries.is_empty() {
        return Insight::insufficient(INSUFFICIENT_HISTORY);
    }

    tracing::debug!(entries = entries.len(), "Analyzing diary patterns");

    Insight::Ready(PatternReport {
        writing_frequency: analyze_frequency(entries),
        common_themes: analyze_themes(entries),
        mood_patterns: analyze_mood_patterns(entries),
        growth_indicators: analyze_growth(entries),
    })
}
