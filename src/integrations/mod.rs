//! External Collaborators
//!
//! The diary core talks to two outside services through traits:
//! - **DocumentStore**: remote database holding the published diary pages
//! - **ModelClient**: language model producing title, mood, summary, advice
//!
//! Concrete clients live outside this crate; [`DiaryManager`] wires them to
//! the local history and context builder.

mod manager;

pub use manager::{CreatedDiary, DiaryManager};

use crate::storage::{AnalysisResult, StorageError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to an entry in the remote document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHandle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub created_time: Option<String>,
}

/// Remote diary database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a page; `date` defaults to today on the remote side
    async fn create_entry(
        &self,
        title: &str,
        content: &str,
        date: Option<NaiveDate>,
    ) -> Result<EntryHandle, IntegrationError>;

    /// Most recent pages, newest first
    async fn query_recent(&self, limit: usize) -> Result<Vec<EntryHandle>, IntegrationError>;

    /// Append a text block (comment, analysis) to an existing page
    async fn append_block(&self, entry: &EntryHandle, content: &str)
        -> Result<(), IntegrationError>;
}

/// Language model used to analyse entries
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_title(&self, content: &str) -> Result<String, IntegrationError>;

    /// Emotion analysis, expected to carry `overall_mood`
    async fn analyze_emotion(&self, content: &str) -> Result<Value, IntegrationError>;

    async fn generate_summary(&self, content: &str) -> Result<String, IntegrationError>;

    /// Advice personalised with the prompt `context`
    async fn generate_advice(&self, content: &str, context: &str)
        -> Result<String, IntegrationError>;
}

/// Errors that can occur while talking to collaborators
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("Document store error: {0}")]
    DocumentStore(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Text block attached to the remote page after analysis
pub fn analysis_block(analysis: &AnalysisResult) -> String {
    let mut lines = vec!["🤖 AI分析結果".to_string()];

    if let Some(summary) = analysis.summary().filter(|s| !s.is_empty()) {
        lines.push(format!("📊 要約: {}", summary));
    }
    if let Some(advice) = analysis.advice().filter(|a| !a.is_empty()) {
        lines.push(format!("💡 アドバイス: {}", advice));
    }
    if let Some(mood) = analysis.overall_mood() {
        lines.push(format!("😊 全体的な気分: {}", mood));
    }

    lines.join("\n")
}
