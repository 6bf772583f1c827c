//! Writing frequency
//!
//! How many distinct calendar days carry at least one entry, relative to
//! the span between the first and the last of them.

use crate::analysis::Insight;
use crate::storage::Entry;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub const INSUFFICIENT_FREQUENCY: &str = "頻度分析には2つ以上のエントリが必要です";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritingFrequency {
    pub total_entries: usize,
    /// Distinct dates with at least one entry
    pub writing_days: usize,
    /// Inclusive span from first to last date
    pub total_period_days: i64,
    pub frequency_percentage: f64,
}

pub fn analyze_frequency(entries: &[Entry]) -> Insight<WritingFrequency> {
    if entries.len() < 2 {
        return Insight::insufficient(INSUFFICIENT_FREQUENCY);
    }

    let dates: BTreeSet<NaiveDate> = entries.iter().map(Entry::date).collect();
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Insight::insufficient(INSUFFICIENT_FREQUENCY);
    };

    let total_period_days = (*last - *first).num_days() + 1;
    let writing_days = dates.len();

    Insight::Ready(WritingFrequency {
        total_entries: entries.len(),
        writing_days,
        total_period_days,
        frequency_percentage: 100.0 * writing_days as f64 / total_period_days.max(1) as f64,
    })
}
