//! History context
//!
//! Renders the entry count, the rolling mood trend and the latest few
//! entries into the text handed to the model as prompt grounding.

use crate::storage::{Entry, UserProfile};

/// Entries listed in the context at most
pub const CONTEXT_ENTRIES: usize = 3;

/// Build the history context from a profile and a newest-first entry list.
///
/// The listed entries are the `CONTEXT_ENTRIES` most recent ones, printed
/// oldest first. Returns an empty string when there is nothing to say.
pub fn history_context(profile: Option<&UserProfile>, recent: &[Entry], days: i64) -> String {
    let mut parts = Vec::new();

    if let Some(profile) = profile {
        parts.push(format!(
            "このユーザーは{}回日記を書いています。",
            profile.total_entries
        ));

        if let Some(trend) = &profile.recent_mood_trend {
            parts.push(format!(
                "最近の気分傾向: ポジティブ{:.1}%, 主要な気分: {}",
                trend.positive_ratio * 100.0,
                trend.dominant_mood
            ));
        }
    }

    if !recent.is_empty() {
        parts.push(format!("\n過去{}日間の日記:", days));

        let latest = &recent[..recent.len().min(CONTEXT_ENTRIES)];
        for entry in latest.iter().rev() {
            parts.push(format!(
                "- {}: 「{}」- {}",
                entry.date(),
                entry.title,
                entry.summary_or_default()
            ));
        }
    }

    parts.join("\n")
}

/// Basics from the profile embedded in the history document
pub fn embedded_profile_context(profile: &UserProfile) -> String {
    let mut parts = Vec::new();

    if !profile.name.is_empty() {
        parts.push(format!("名前: {}", profile.name));
    }
    if !profile.age.is_empty() {
        parts.push(format!("年齢: {}", profile.age));
    }
    if !profile.occupation.is_empty() {
        parts.push(format!("職業: {}", profile.occupation));
    }
    if !profile.interests.is_empty() {
        parts.push(format!("興味・関心: {}", profile.interests.join(", ")));
    }
    if !profile.goals.is_empty() {
        parts.push(format!("目標: {}", profile.goals.join(", ")));
    }

    parts.join("\n")
}
