//! Text reports for the CLI
//!
//! Plain-text renderings of the analytics and the history overview. Every
//! line ends with a newline.

use crate::analysis::{Insight, PatternReport};
use crate::storage::{HistorySummary, UserProfile};
use std::fmt::Write;

/// Summaries longer than this are cut in the history report
pub const SUMMARY_PREVIEW_CHARS: usize = 50;

pub const NO_ENTRIES_IN_RANGE: &str = "指定期間内の日記がありません";

/// Analytics report from the embedded profile and the pattern analyses
///
/// Sections whose data is missing are left out.
pub fn analytics_report(profile: Option<&UserProfile>, patterns: &Insight<PatternReport>) -> String {
    let mut out = String::from("📊 あなたの日記分析レポート\n\n");

    let total = profile.map_or(0, |p| p.total_entries);
    let _ = writeln!(out, "📝 総日記数: {}件", total);

    if let Some(trend) = profile.and_then(|p| p.recent_mood_trend.as_ref()) {
        let _ = writeln!(
            out,
            "😊 最近の気分: ポジティブ{:.1}% (主な気分: {})",
            trend.positive_ratio * 100.0,
            trend.dominant_mood
        );
    }

    if let Some(report) = patterns.ready() {
        if let Some(moods) = report.mood_patterns.ready() {
            let _ = writeln!(out, "🎭 最も多い気分: {}", moods.most_common_mood);
        }
        if let Some(growth) = report.growth_indicators.ready() {
            if growth.writing_length_trend.improvement {
                out.push_str("📈 文章量が増加傾向にあります（成長の兆し！）\n");
            } else {
                out.push_str("📝 文章量は安定しています\n");
            }
        }
    }

    out
}

fn preview(summary: &str) -> String {
    if summary.chars().count() > SUMMARY_PREVIEW_CHARS {
        let cut: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        summary.to_string()
    }
}

/// Overview of the last `days` days, one line per entry, newest first
pub fn history_report(summary: Option<&HistorySummary>, days: i64) -> String {
    let Some(summary) = summary else {
        return format!("{}\n", NO_ENTRIES_IN_RANGE);
    };

    let mut out = String::new();
    let _ = writeln!(out, "📅 過去{}日間の日記履歴", days);
    let _ = writeln!(out, "📝 総数: {}件", summary.total_entries);
    let _ = writeln!(
        out,
        "📆 期間: {} ～ {}",
        summary.date_range.start, summary.date_range.end
    );

    for line in &summary.entries {
        let _ = writeln!(
            out,
            "- {} 「{}」 [{}] {}",
            line.date,
            line.title,
            line.mood,
            preview(&line.summary)
        );
    }

    out
}
