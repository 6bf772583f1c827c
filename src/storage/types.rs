//! Core data types for the diary history document
//!
//! This module defines the records persisted in `diary_history.json`:
//! - `Entry`: one journal submission with its model analysis
//! - `AnalysisResult`: the opaque analysis produced by the model client
//! - `UserProfile`: the embedded profile with derived mood statistics
//! - `HistoryDocument`: the whole file (`diaries` + `user_profile`)

use crate::analysis::mood::tally_moods;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Mood label counted towards the positive ratio
pub const POSITIVE_MOOD: &str = "positive";

/// Number of most recent mood records the trend is computed over
pub const MOOD_WINDOW: usize = 30;

/// Shown when an entry has no stored summary
pub const NO_SUMMARY: &str = "要約なし";

/// Shown when a mood cannot be resolved
pub const UNKNOWN_MOOD: &str = "不明";

/// Current local time, the clock every new record is stamped with
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Analysis attached to an entry by the model client
///
/// Expected to look like `{"summary": .., "advice": .., "emotions":
/// {"overall_mood": "positive" | "neutral" | "negative", ..}}` but nothing
/// is enforced: any JSON value is stored as-is and the accessors return
/// `None` for missing or mistyped keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// Build the usual three-part analysis
    pub fn new(emotions: Value, summary: impl Into<String>, advice: impl Into<String>) -> Self {
        Self(json!({
            "emotions": emotions,
            "summary": summary.into(),
            "advice": advice.into(),
        }))
    }

    /// Wrap an arbitrary value returned by a model client
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Builder: analysis carrying only an overall mood
    pub fn with_mood(mood: impl Into<String>) -> Self {
        Self(json!({ "emotions": { "overall_mood": mood.into() } }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(Value::as_str)
    }

    pub fn advice(&self) -> Option<&str> {
        self.0.get("advice").and_then(Value::as_str)
    }

    pub fn emotions(&self) -> Option<&Map<String, Value>> {
        self.0.get("emotions").and_then(Value::as_object)
    }

    /// `emotions.overall_mood`, if present and a string
    pub fn overall_mood(&self) -> Option<&str> {
        self.emotions()?.get("overall_mood")?.as_str()
    }
}

/// A single diary entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// 1-based position at insertion time
    #[serde(rename = "id")]
    pub sequence_id: u64,
    pub title: String,
    pub content: String,
    /// Local creation time
    pub created_at: NaiveDateTime,
    #[serde(rename = "ai_analysis", default)]
    pub analysis: AnalysisResult,
    /// Character count of `content`
    #[serde(rename = "word_count")]
    pub length: usize,
}

impl Entry {
    pub fn new(
        sequence_id: u64,
        title: impl Into<String>,
        content: impl Into<String>,
        analysis: AnalysisResult,
        created_at: NaiveDateTime,
    ) -> Self {
        let content = content.into();
        Self {
            sequence_id,
            title: title.into(),
            length: content.chars().count(),
            content,
            created_at,
            analysis,
        }
    }

    /// Calendar date the entry was written on
    pub fn date(&self) -> NaiveDate {
        self.created_at.date()
    }

    pub fn mood(&self) -> Option<&str> {
        self.analysis.overall_mood()
    }

    pub fn summary_or_default(&self) -> &str {
        self.analysis.summary().unwrap_or(NO_SUMMARY)
    }
}

/// One observed mood, keyed by the date of the entry it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub date: NaiveDate,
    pub mood: String,
}

/// Rolling statistic over the most recent `MOOD_WINDOW` mood records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodTrend {
    /// Share of "positive" records in the window, in [0, 1]
    pub positive_ratio: f64,
    /// Most frequent mood; ties go to the one seen first in the window
    pub dominant_mood: String,
}

impl MoodTrend {
    /// Compute the trend over the last `MOOD_WINDOW` records
    pub fn from_history(history: &[MoodRecord]) -> Option<Self> {
        let window = &history[history.len().saturating_sub(MOOD_WINDOW)..];
        if window.is_empty() {
            return None;
        }

        let positive = window.iter().filter(|r| r.mood == POSITIVE_MOOD).count();
        let counts = tally_moods(window.iter().map(|r| r.mood.as_str()));
        let dominant = counts.dominant()?.to_string();

        Some(Self {
            positive_ratio: positive as f64 / window.len() as f64,
            dominant_mood: dominant,
        })
    }
}

/// User profile embedded in the history document
///
/// `total_entries`, `mood_history` and `recent_mood_trend` are derived and
/// only ever written by the history store. Keys this crate does not know
/// about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "now_local")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub total_entries: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mood_history: Vec<MoodRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_mood_trend: Option<MoodTrend>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Fresh profile as written on first use
    pub fn new() -> Self {
        let mut extra = Map::new();
        extra.insert("personality_traits".to_string(), json!({}));
        extra.insert("recurring_themes".to_string(), json!([]));
        extra.insert("growth_areas".to_string(), json!([]));

        Self {
            created_at: now_local(),
            total_entries: 0,
            name: String::new(),
            age: String::new(),
            occupation: String::new(),
            interests: Vec::new(),
            goals: Vec::new(),
            mood_history: Vec::new(),
            recent_mood_trend: None,
            extra,
        }
    }

    /// Append a mood observation and refresh the trend
    pub fn record_mood(&mut self, date: NaiveDate, mood: impl Into<String>) {
        self.mood_history.push(MoodRecord {
            date,
            mood: mood.into(),
        });
        self.recent_mood_trend = MoodTrend::from_history(&self.mood_history);
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole history file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub diaries: Vec<Entry>,
    #[serde(default)]
    pub user_profile: UserProfile,
}

/// Caller-editable subset of the embedded profile
///
/// Deserializing from a JSON object silently drops every key other than
/// `name`, `age`, `occupation`, `interests` and `goals`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<String>,
    pub occupation: Option<String>,
    pub interests: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn interests(mut self, interests: Vec<String>) -> Self {
        self.interests = Some(interests);
        self
    }

    pub fn goals(mut self, goals: Vec<String>) -> Self {
        self.goals = Some(goals);
        self
    }

    /// Shallow per-key overwrite; derived fields are never touched
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(age) = &self.age {
            profile.age = age.clone();
        }
        if let Some(occupation) = &self.occupation {
            profile.occupation = occupation.clone();
        }
        if let Some(interests) = &self.interests {
            profile.interests = interests.clone();
        }
        if let Some(goals) = &self.goals {
            profile.goals = goals.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_analysis_accessors() {
        let analysis = AnalysisResult::new(
            json!({"overall_mood": "neutral", "confidence": 0.8}),
            "散歩した",
            "続けましょう",
        );

        assert_eq!(analysis.summary(), Some("散歩した"));
        assert_eq!(analysis.advice(), Some("続けましょう"));
        assert_eq!(analysis.overall_mood(), Some("neutral"));
    }

    #[test]
    fn test_malformed_analysis_degrades() {
        let analysis = AnalysisResult::from_value(json!({
            "emotions": "JSON解析エラー",
            "summary": 42,
        }));
        assert_eq!(analysis.overall_mood(), None);
        assert_eq!(analysis.summary(), None);

        let empty = AnalysisResult::default();
        assert_eq!(empty.overall_mood(), None);
        assert_eq!(empty.advice(), None);
    }

    #[test]
    fn test_entry_length_counts_characters() {
        let entry = Entry::new(1, "t", "今日は晴れ", AnalysisResult::default(), now_local());
        assert_eq!(entry.length, 5);
        assert_eq!(entry.summary_or_default(), NO_SUMMARY);
    }

    #[test]
    fn test_entry_uses_document_key_names() {
        let entry = Entry::new(3, "t", "abc", AnalysisResult::with_mood("positive"), now_local());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["word_count"], 3);
        assert_eq!(value["ai_analysis"]["emotions"]["overall_mood"], "positive");
    }

    #[test]
    fn test_entry_reads_python_timestamps() {
        let raw = r#"{
            "id": 1,
            "title": "朝",
            "content": "早起きした",
            "created_at": "2024-03-01T07:15:30.123456",
            "ai_analysis": {"summary": "早起き"},
            "word_count": 5
        }"#;
        let entry: Entry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.date(), date(1));
        assert_eq!(entry.summary_or_default(), "早起き");
    }

    #[test]
    fn test_mood_trend_ratio_and_dominant() {
        let mut profile = UserProfile::new();
        profile.record_mood(date(1), "positive");
        profile.record_mood(date(2), "negative");
        profile.record_mood(date(3), "negative");

        let trend = profile.recent_mood_trend.unwrap();
        assert!((trend.positive_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(trend.dominant_mood, "negative");
    }

    #[test]
    fn test_mood_trend_tie_goes_to_first_seen() {
        let history = vec![
            MoodRecord { date: date(1), mood: "neutral".into() },
            MoodRecord { date: date(2), mood: "positive".into() },
            MoodRecord { date: date(3), mood: "positive".into() },
            MoodRecord { date: date(4), mood: "neutral".into() },
        ];
        let trend = MoodTrend::from_history(&history).unwrap();
        assert_eq!(trend.dominant_mood, "neutral");
        assert_eq!(trend.positive_ratio, 0.5);
    }

    #[test]
    fn test_mood_trend_uses_last_thirty() {
        let mut history: Vec<MoodRecord> = (0..10)
            .map(|_| MoodRecord { date: date(1), mood: "negative".into() })
            .collect();
        history.extend((0..30).map(|_| MoodRecord { date: date(2), mood: "positive".into() }));

        let trend = MoodTrend::from_history(&history).unwrap();
        assert_eq!(trend.positive_ratio, 1.0);
        assert_eq!(trend.dominant_mood, "positive");
        assert!(MoodTrend::from_history(&[]).is_none());
    }

    #[test]
    fn test_profile_preserves_unknown_keys() {
        let raw = r#"{
            "created_at": "2024-01-01T00:00:00",
            "total_entries": 2,
            "name": "花子",
            "recurring_themes": ["仕事"],
            "favourite_colour": "blue"
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.name, "花子");
        assert_eq!(profile.extra["favourite_colour"], "blue");

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["recurring_themes"], json!(["仕事"]));
    }

    #[test]
    fn test_profile_update_ignores_unknown_keys() {
        let update: ProfileUpdate = serde_json::from_value(json!({
            "name": "太郎",
            "goals": ["毎日書く"],
            "total_entries": 999,
            "mood_history": []
        }))
        .unwrap();

        let mut profile = UserProfile::new();
        profile.total_entries = 4;
        profile.record_mood(date(1), "positive");
        update.apply(&mut profile);

        assert_eq!(profile.name, "太郎");
        assert_eq!(profile.goals, vec!["毎日書く".to_string()]);
        assert_eq!(profile.total_entries, 4);
        assert_eq!(profile.mood_history.len(), 1);
    }
}
