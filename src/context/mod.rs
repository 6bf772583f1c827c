//! Context Builder
//!
//! Composes the natural-language context passed to the model client.
//!
//! ## Sources
//!
//! - **history**: entry count, rolling mood trend, latest entries
//! - **profile**: the external profile with template placeholders removed
//!
//! Building never fails: any storage error is logged and yields an empty
//! string. When both parts are present the profile block precedes the
//! history block (see [`compose_context`]).

pub mod history;
pub mod profile;

pub use history::{embedded_profile_context, history_context, CONTEXT_ENTRIES};
pub use profile::{is_set, placeholder, placeholder_template, profile_context, profile_summary};

use crate::storage::{DiaryHistory, ProfileStore, StorageResult};
use std::sync::Arc;

/// Default look-back window for the history context
pub const DEFAULT_CONTEXT_DAYS: i64 = 7;

const PROFILE_BLOCK: &str = "【ユーザープロフィール】";
const HISTORY_BLOCK: &str = "【日記履歴】";

/// Builds prompt context from the two stores
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    history: Arc<DiaryHistory>,
    profiles: Arc<ProfileStore>,
}

impl ContextBuilder {
    pub fn new(history: Arc<DiaryHistory>, profiles: Arc<ProfileStore>) -> Self {
        Self { history, profiles }
    }

    /// History context over the last `days` days
    pub fn build_history_context(&self, days: i64) -> String {
        match self.try_history_context(days) {
            Ok(context) => context,
            Err(e) => {
                tracing::error!("Failed to build history context: {}", e);
                String::new()
            }
        }
    }

    fn try_history_context(&self, days: i64) -> StorageResult<String> {
        let profile = self.history.try_profile()?;
        let recent = self.history.try_recent_entries(days)?;
        Ok(history_context(profile.as_ref(), &recent, days))
    }

    /// Context from the external profile document
    pub fn build_profile_context(&self) -> String {
        profile_context(&self.profiles.load())
    }

    /// Basics from the profile embedded in the history document
    pub fn build_embedded_profile_context(&self) -> String {
        self.history
            .get_profile()
            .map(|p| embedded_profile_context(&p))
            .unwrap_or_default()
    }

    /// Profile and history context combined into labelled blocks
    pub fn build_full_context(&self, days: i64) -> String {
        let context = compose_context(
            &self.build_profile_context(),
            &self.build_history_context(days),
        );
        tracing::debug!(chars = context.chars().count(), days, "Built prompt context");
        context
    }
}

/// Join profile and history context; either may be empty
pub fn compose_context(profile: &str, history: &str) -> String {
    let mut blocks = Vec::new();
    if !profile.is_empty() {
        blocks.push(format!("{}\n{}", PROFILE_BLOCK, profile));
    }
    if !history.is_empty() {
        blocks.push(format!("{}\n{}", HISTORY_BLOCK, history));
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AnalysisResult, ExternalProfile, ProfileUpdate, HISTORY_FILE};
    use serde_json::json;
    use tempfile::tempdir;

    fn builder(dir: &std::path::Path) -> (ContextBuilder, Arc<DiaryHistory>, Arc<ProfileStore>) {
        let history = Arc::new(DiaryHistory::in_dir(dir));
        let profiles = Arc::new(ProfileStore::in_dir(dir));
        (
            ContextBuilder::new(Arc::clone(&history), Arc::clone(&profiles)),
            history,
            profiles,
        )
    }

    #[test]
    fn test_compose_context() {
        assert_eq!(compose_context("", ""), "");
        assert_eq!(compose_context("p", ""), "【ユーザープロフィール】\np");
        assert_eq!(compose_context("", "h"), "【日記履歴】\nh");
        assert_eq!(
            compose_context("p", "h"),
            "【ユーザープロフィール】\np\n\n【日記履歴】\nh"
        );
    }

    #[test]
    fn test_fresh_stores() {
        let dir = tempdir().unwrap();
        let (builder, _, _) = builder(dir.path());

        assert_eq!(
            builder.build_history_context(DEFAULT_CONTEXT_DAYS),
            "このユーザーは0回日記を書いています。"
        );
        assert_eq!(builder.build_profile_context(), "");
        assert_eq!(builder.build_embedded_profile_context(), "");
    }

    #[test]
    fn test_history_context_from_store() {
        let dir = tempdir().unwrap();
        let (builder, history, _) = builder(dir.path());

        history.append_entry(
            "初めての日記",
            "今日から日記を始める",
            AnalysisResult::new(json!({"overall_mood": "positive"}), "日記を始めた", "続けよう"),
        );

        let context = builder.build_history_context(7);
        assert!(context.starts_with("このユーザーは1回日記を書いています。\n"));
        assert!(context.contains("ポジティブ100.0%, 主要な気分: positive"));
        assert!(context.contains("過去7日間の日記:"));
        assert!(context.contains("「初めての日記」- 日記を始めた"));
    }

    #[test]
    fn test_unreadable_history_yields_empty_context() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(HISTORY_FILE), "{{{").unwrap();
        let (builder, _, _) = builder(dir.path());

        assert_eq!(builder.build_history_context(7), "");
        assert_eq!(builder.build_full_context(7), "");
    }

    #[test]
    fn test_full_context_orders_profile_first() {
        let dir = tempdir().unwrap();
        let (builder, history, profiles) = builder(dir.path());

        let mut profile = ExternalProfile::default();
        profile.notes = "夜勤あり".into();
        profiles.save(&profile);
        history.update_profile(&ProfileUpdate::new().name("花子"));

        let context = builder.build_full_context(7);
        assert!(context.starts_with("【ユーザープロフィール】\n【その他】\n- 夜勤あり"));
        assert!(context.contains("\n\n【日記履歴】\nこのユーザーは0回"));
        assert_eq!(builder.build_embedded_profile_context(), "名前: 花子");
    }
}
