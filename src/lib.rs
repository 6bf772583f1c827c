//! # Diary
//!
//! Journal history and context engine: keeps a local, append-only record of
//! diary entries with their analysis, derives mood and writing patterns, and
//! turns both into the personalised context handed to a language model.
//!
//! ## Modules
//!
//! - [`storage`]: JSON-document history and profile stores
//! - [`analysis`]: writing frequency, themes, mood and growth statistics
//! - [`context`]: prompt context from history and profile
//! - [`integrations`]: document store / model client seams and the manager
//! - [`report`]: text reports for the CLI
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diary::storage::*;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let history = DiaryHistory::in_dir(Path::new("./diary_data"));
//!
//! history.append_entry(
//!     "雨の日",
//!     "一日中雨だったので家で本を読んだ",
//!     AnalysisResult::new(json!({"overall_mood": "neutral"}), "読書の日", "散歩もしてみよう"),
//! );
//!
//! for entry in history.get_recent_entries(7) {
//!     println!("{} {}", entry.date(), entry.title);
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod context;
pub mod integrations;
pub mod report;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    AnalysisResult, DiaryHistory, Entry, ExternalProfile, ProfileStore, ProfileUpdate,
    StorageError, StorageResult, UserProfile,
};

pub use analysis::{analyze_patterns, Insight, PatternReport};

pub use context::{compose_context, ContextBuilder};

pub use integrations::{
    CreatedDiary, DiaryManager, DocumentStore, EntryHandle, IntegrationError, ModelClient,
};

pub use config::{Config, ConfigError, LoggingConfig};
