//! Diary Storage
//!
//! Durable state lives in two independent JSON documents:
//!
//! - **history**: append-only diary entries plus the embedded user profile
//!   (`diary_history.json`)
//! - **profile**: the hand-edited external profile (`profile.json`)
//! - **document**: locked, atomically rewritten JSON file shared by both
//! - **types**: entry / profile records
//! - **error**: error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   append_entry → lock → read → push + derive profile → tmp file → rename
//!
//! Read Path:
//!   read whole document → filter / snapshot
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use diary::storage::{AnalysisResult, DiaryHistory};
//!
//! let history = DiaryHistory::in_dir(std::path::Path::new("./data"));
//! history.append_entry("散歩", "川沿いを歩いた", AnalysisResult::with_mood("positive"));
//!
//! for entry in history.get_recent_entries(7) {
//!     println!("{} {}", entry.date(), entry.title);
//! }
//! ```

pub mod document;
pub mod error;
pub mod history;
pub mod profile;
pub mod types;

// Re-export commonly used types
pub use document::JsonDocument;
pub use error::{StorageError, StorageResult};
pub use history::{DateRange, DiaryHistory, HistorySummary, SummaryLine, HISTORY_FILE};
pub use profile::{ExternalProfile, Goals, Personality, Preferences, ProfileStore, PROFILE_FILE};
pub use types::{
    now_local, AnalysisResult, Entry, HistoryDocument, MoodRecord, MoodTrend, ProfileUpdate,
    UserProfile, MOOD_WINDOW, NO_SUMMARY, POSITIVE_MOOD, UNKNOWN_MOOD,
};
