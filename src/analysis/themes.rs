//! Recurring themes
//!
//! A word-frequency heuristic, not topic modelling: content is split on
//! whitespace, tokens of three or more characters are counted across the
//! whole corpus and the most frequent few are reported.

use crate::storage::Entry;
use std::collections::HashMap;

/// How many themes are reported
pub const THEME_LIMIT: usize = 5;

/// Tokens must be strictly longer than this many characters
pub const MIN_TOKEN_CHARS: usize = 2;

/// Most frequent tokens, ties in first-seen order. Empty when no token
/// qualifies.
pub fn analyze_themes(entries: &[Entry]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for token in entries
        .iter()
        .flat_map(|e| e.content.split_whitespace())
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
    {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(THEME_LIMIT)
        .map(str::to_string)
        .collect()
}
