//! Mood distribution
//!
//! Counts `emotions.overall_mood` across entries. Counting keeps
//! first-seen order so "most frequent" ties resolve to the mood that
//! appeared first; the history store's rolling trend uses the same rule.

use crate::analysis::Insight;
use crate::storage::Entry;
use serde::{Serialize, Serializer};

pub const INSUFFICIENT_MOODS: &str = "気分データが不足しています";

/// Mood → occurrence count, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodDistribution(Vec<(String, usize)>);

impl MoodDistribution {
    pub fn get(&self, mood: &str) -> usize {
        self.0
            .iter()
            .find(|(m, _)| m == mood)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(m, c)| (m.as_str(), *c))
    }

    /// Highest count; earliest mood wins a tie
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (mood, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((mood, count)),
            }
        }
        best.map(|(mood, _)| mood)
    }
}

impl Serialize for MoodDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Count moods in iteration order
pub fn tally_moods<'a>(moods: impl IntoIterator<Item = &'a str>) -> MoodDistribution {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for mood in moods {
        match counts.iter_mut().find(|(m, _)| m == mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((mood.to_string(), 1)),
        }
    }
    MoodDistribution(counts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodPatterns {
    pub mood_distribution: MoodDistribution,
    pub most_common_mood: String,
}

/// Distribution of resolvable moods over every entry
pub fn analyze_mood_patterns(entries: &[Entry]) -> Insight<MoodPatterns> {
    let distribution = tally_moods(entries.iter().filter_map(Entry::mood));

    let Some(most_common) = distribution.dominant().map(str::to_string) else {
        return Insight::insufficient(INSUFFICIENT_MOODS);
    };

    Insight::Ready(MoodPatterns {
        mood_distribution: distribution,
        most_common_mood: most_common,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{now_local, AnalysisResult};

    fn entry(mood: Option<&str>) -> Entry {
        let analysis = match mood {
            Some(m) => AnalysisResult::with_mood(m),
            None => AnalysisResult::default(),
        };
        Entry::new(1, "t", "content", analysis, now_local())
    }

    #[test]
    fn test_distribution_and_most_common() {
        let entries = vec![
            entry(Some("neutral")),
            entry(Some("positive")),
            entry(None),
            entry(Some("positive")),
        ];

        let patterns = analyze_mood_patterns(&entries);
        let patterns = patterns.ready().unwrap();
        assert_eq!(patterns.most_common_mood, "positive");
        assert_eq!(patterns.mood_distribution.get("positive"), 2);
        assert_eq!(patterns.mood_distribution.get("neutral"), 1);
        assert_eq!(patterns.mood_distribution.get("negative"), 0);
    }

    #[test]
    fn test_tie_goes_to_first_key() {
        let counts = tally_moods(["negative", "positive", "positive", "negative"]);
        assert_eq!(counts.dominant(), Some("negative"));
    }

    #[test]
    fn test_no_moods_is_insufficient() {
        let result = analyze_mood_patterns(&[entry(None), entry(None)]);
        assert_eq!(result.message(), Some(INSUFFICIENT_MOODS));
        assert!(analyze_mood_patterns(&[]).ready().is_none());
    }

    #[test]
    fn test_distribution_serializes_as_ordered_map() {
        let counts = tally_moods(["neutral", "positive", "neutral"]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"neutral":2,"positive":1}"#);
    }
}
