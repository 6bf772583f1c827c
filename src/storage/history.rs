//! Diary History Store
//!
//! Append-only log of entries plus the embedded user profile, persisted as
//! one JSON document (`diaries` + `user_profile`).
//!
//! Write path:
//!   lock → read document → push entry → refresh derived profile → rename
//!
//! The public accessors never fail: storage errors are logged and mapped to
//! `false`, an empty list or `None`. Each has a `try_*` twin returning the
//! underlying `StorageResult`.

use crate::analysis::{analyze_patterns, Insight, PatternReport};
use crate::storage::document::JsonDocument;
use crate::storage::error::StorageResult;
use crate::storage::types::{
    now_local, AnalysisResult, Entry, HistoryDocument, ProfileUpdate, UserProfile, UNKNOWN_MOOD,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name used inside a data directory
pub const HISTORY_FILE: &str = "diary_history.json";

/// Durable store for diary entries and the embedded user profile
#[derive(Debug)]
pub struct DiaryHistory {
    document: JsonDocument<HistoryDocument>,
}

impl DiaryHistory {
    /// Open (and create if absent) the history document at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let document = JsonDocument::new(path);

        match document.initialize(HistoryDocument::default) {
            Ok(true) => tracing::info!("Created history document {:?}", document.path()),
            Ok(false) => tracing::debug!("Using history document {:?}", document.path()),
            Err(e) => tracing::error!(
                "Failed to initialise history document {:?}: {}",
                document.path(),
                e
            ),
        }

        Self { document }
    }

    /// Open `diary_history.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::open(data_dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    fn load(&self) -> StorageResult<HistoryDocument> {
        Ok(self.document.read()?.unwrap_or_default())
    }

    /// Append a new entry stamped with the current local time
    pub fn append_entry(&self, title: &str, content: &str, analysis: AnalysisResult) -> bool {
        match self.try_append_entry(title, content, analysis) {
            Ok(entry) => {
                tracing::info!(id = entry.sequence_id, title = %entry.title, "Appended diary entry");
                true
            }
            Err(e) => {
                tracing::error!("Failed to append diary entry to {:?}: {}", self.path(), e);
                false
            }
        }
    }

    pub fn try_append_entry(
        &self,
        title: &str,
        content: &str,
        analysis: AnalysisResult,
    ) -> StorageResult<Entry> {
        self.try_append_entry_at(title, content, analysis, now_local())
    }

    /// Append an entry with an explicit creation time (backfilling old diaries)
    ///
    /// The sequence id is still the insertion position, not the
    /// chronological one.
    pub fn try_append_entry_at(
        &self,
        title: &str,
        content: &str,
        analysis: AnalysisResult,
        created_at: NaiveDateTime,
    ) -> StorageResult<Entry> {
        self.document.update(HistoryDocument::default, |doc| {
            let entry = Entry::new(
                doc.diaries.len() as u64 + 1,
                title,
                content,
                analysis,
                created_at,
            );
            doc.diaries.push(entry.clone());

            let profile = &mut doc.user_profile;
            profile.total_entries = doc.diaries.len();
            if let Some(mood) = entry.mood() {
                profile.record_mood(entry.date(), mood);
            }

            entry
        })
    }

    /// Entries created within the last `days` days, newest first
    pub fn get_recent_entries(&self, days: i64) -> Vec<Entry> {
        self.try_recent_entries(days).unwrap_or_else(|e| {
            tracing::error!("Failed to read recent entries from {:?}: {}", self.path(), e);
            Vec::new()
        })
    }

    pub fn try_recent_entries(&self, days: i64) -> StorageResult<Vec<Entry>> {
        let cutoff = now_local() - Duration::days(days);
        let mut recent: Vec<Entry> = self
            .load()?
            .diaries
            .into_iter()
            .filter(|e| e.created_at >= cutoff)
            .collect();

        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recent)
    }

    /// Snapshot of every entry in insertion order
    pub fn entries(&self) -> Vec<Entry> {
        match self.load() {
            Ok(doc) => doc.diaries,
            Err(e) => {
                tracing::error!("Failed to read entries from {:?}: {}", self.path(), e);
                Vec::new()
            }
        }
    }

    /// The embedded profile, or `None` if the document cannot be read
    pub fn get_profile(&self) -> Option<UserProfile> {
        match self.try_profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!("Failed to read user profile from {:?}: {}", self.path(), e);
                None
            }
        }
    }

    pub fn try_profile(&self) -> StorageResult<Option<UserProfile>> {
        Ok(self.document.read()?.map(|doc| doc.user_profile))
    }

    /// Merge the editable profile keys into the stored profile
    pub fn update_profile(&self, update: &ProfileUpdate) -> bool {
        match self.try_update_profile(update) {
            Ok(()) => {
                tracing::info!("Updated user profile");
                true
            }
            Err(e) => {
                tracing::error!("Failed to update user profile in {:?}: {}", self.path(), e);
                false
            }
        }
    }

    pub fn try_update_profile(&self, update: &ProfileUpdate) -> StorageResult<()> {
        self.document
            .update(HistoryDocument::default, |doc| update.apply(&mut doc.user_profile))
    }

    /// Run the pattern analyses over the current entries
    pub fn analyze_patterns(&self) -> Insight<PatternReport> {
        analyze_patterns(&self.entries())
    }

    /// Per-entry overview of the last `days` days, `None` if there is nothing
    pub fn history_summary(&self, days: i64) -> Option<HistorySummary> {
        HistorySummary::from_recent(&self.get_recent_entries(days))
    }
}

/// Overview of the entries in a recent window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_entries: usize,
    pub date_range: DateRange,
    pub entries: Vec<SummaryLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub title: String,
    pub date: NaiveDate,
    pub summary: String,
    pub mood: String,
}

impl HistorySummary {
    /// Build from a newest-first list as returned by `get_recent_entries`
    pub fn from_recent(recent: &[Entry]) -> Option<Self> {
        let newest = recent.first()?;
        let oldest = recent.last()?;

        Some(Self {
            total_entries: recent.len(),
            date_range: DateRange {
                start: oldest.date(),
                end: newest.date(),
            },
            entries: recent
                .iter()
                .map(|e| SummaryLine {
                    title: e.title.clone(),
                    date: e.date(),
                    summary: e.summary_or_default().to_string(),
                    mood: e.mood().unwrap_or(UNKNOWN_MOOD).to_string(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn open_test_history() -> (DiaryHistory, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let history = DiaryHistory::in_dir(dir.path());
        (history, dir)
    }

    #[test]
    fn test_open_creates_empty_document() {
        let (history, _dir) = open_test_history();

        assert!(history.path().exists());
        assert!(history.entries().is_empty());

        let profile = history.get_profile().unwrap();
        assert_eq!(profile.total_entries, 0);
        assert!(profile.recent_mood_trend.is_none());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(history.path()).unwrap()).unwrap();
        assert_eq!(raw["diaries"], json!([]));
        assert_eq!(raw["user_profile"]["growth_areas"], json!([]));
    }

    #[test]
    fn test_total_entries_tracks_count() {
        let (history, _dir) = open_test_history();

        for i in 0..7 {
            assert!(history.append_entry(
                &format!("day {}", i),
                "今日も書いた",
                AnalysisResult::default()
            ));
            assert_eq!(history.get_profile().unwrap().total_entries, i + 1);
        }

        let ids: Vec<u64> = history.entries().iter().map(|e| e.sequence_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_mood_trend_after_appends() {
        let (history, _dir) = open_test_history();

        history.append_entry("a", "good", AnalysisResult::with_mood("positive"));
        history.append_entry("b", "bad", AnalysisResult::with_mood("negative"));
        history.append_entry("c", "bad", AnalysisResult::with_mood("negative"));

        let profile = history.get_profile().unwrap();
        let trend = profile.recent_mood_trend.unwrap();
        assert!((trend.positive_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(trend.dominant_mood, "negative");
        assert_eq!(profile.mood_history.len(), 3);
    }

    #[test]
    fn test_entry_without_mood_skips_mood_history() {
        let (history, _dir) = open_test_history();

        history.append_entry("a", "x", AnalysisResult::from_value(json!({"error": "timeout"})));

        let profile = history.get_profile().unwrap();
        assert_eq!(profile.total_entries, 1);
        assert!(profile.mood_history.is_empty());
        assert!(profile.recent_mood_trend.is_none());
    }

    #[test]
    fn test_recent_entries_window_and_order() {
        let (history, _dir) = open_test_history();
        let now = now_local();

        history
            .try_append_entry_at("old", "x", AnalysisResult::default(), now - Duration::days(10))
            .unwrap();
        history
            .try_append_entry_at("mid", "x", AnalysisResult::default(), now - Duration::days(2))
            .unwrap();
        history
            .try_append_entry_at("new", "x", AnalysisResult::default(), now - Duration::hours(1))
            .unwrap();

        let recent = history.get_recent_entries(7);
        let titles: Vec<&str> = recent.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid"]);

        let cutoff = now_local() - Duration::days(7);
        assert!(recent.iter().all(|e| e.created_at >= cutoff));
        assert_eq!(history.get_recent_entries(30).len(), 3);
    }

    #[test]
    fn test_update_profile_preserves_derived_fields() {
        let (history, _dir) = open_test_history();
        history.append_entry("a", "x", AnalysisResult::with_mood("positive"));

        assert!(history.update_profile(
            &ProfileUpdate::new()
                .name("花子")
                .interests(vec!["読書".into(), "料理".into()])
        ));

        let profile = history.get_profile().unwrap();
        assert_eq!(profile.name, "花子");
        assert_eq!(profile.interests.len(), 2);
        assert_eq!(profile.total_entries, 1);
        assert_eq!(profile.mood_history.len(), 1);
        assert!(profile.recent_mood_trend.is_some());
    }

    #[test]
    fn test_corrupt_document_degrades() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        std::fs::write(&path, "not json at all").unwrap();

        let history = DiaryHistory::open(&path);

        assert!(!history.append_entry("a", "x", AnalysisResult::default()));
        assert!(history.get_recent_entries(7).is_empty());
        assert!(history.get_profile().is_none());
        assert!(!history.update_profile(&ProfileUpdate::new().name("x")));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json at all");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();

        {
            let history = DiaryHistory::in_dir(dir.path());
            history.append_entry("first", "one", AnalysisResult::with_mood("neutral"));
        }

        let history = DiaryHistory::in_dir(dir.path());
        history.append_entry("second", "two", AnalysisResult::with_mood("positive"));

        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].sequence_id, 2);
        assert_eq!(history.get_profile().unwrap().mood_history.len(), 2);
    }

    #[test]
    fn test_history_summary() {
        let (history, _dir) = open_test_history();
        let now = now_local();

        history
            .try_append_entry_at(
                "雨",
                "x",
                AnalysisResult::new(json!({"overall_mood": "negative"}), "雨だった", ""),
                now - Duration::days(3),
            )
            .unwrap();
        history
            .try_append_entry_at("晴れ", "y", AnalysisResult::default(), now)
            .unwrap();

        let summary = history.history_summary(30).unwrap();
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.date_range.start, (now - Duration::days(3)).date());
        assert_eq!(summary.date_range.end, now.date());
        assert_eq!(summary.entries[0].title, "晴れ");
        assert_eq!(summary.entries[0].summary, "要約なし");
        assert_eq!(summary.entries[0].mood, "不明");
        assert_eq!(summary.entries[1].mood, "negative");

        assert!(history.history_summary(1).is_some());
        let (empty, _dir2) = open_test_history();
        assert!(empty.history_summary(30).is_none());
    }
}
