//! Diary Manager
//!
//! Orchestrates one diary submission: context, title, remote page, model
//! analysis, local history, analysis block. Model failures degrade to
//! placeholder text so a diary is never lost because the model is down;
//! only a failed remote create aborts the submission.

use super::{analysis_block, DocumentStore, EntryHandle, IntegrationError, ModelClient};
use crate::context::{ContextBuilder, DEFAULT_CONTEXT_DAYS};
use crate::storage::{now_local, AnalysisResult, DiaryHistory, ProfileStore};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Outcome of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct CreatedDiary {
    pub handle: EntryHandle,
    pub title: String,
    pub analysis: AnalysisResult,
    pub context_used: String,
    /// False when the local history could not be written
    pub saved_locally: bool,
}

/// Ties the remote store and model client to the local stores
pub struct DiaryManager {
    documents: Arc<dyn DocumentStore>,
    model: Arc<dyn ModelClient>,
    history: Arc<DiaryHistory>,
    context: ContextBuilder,
    context_days: i64,
}

impl DiaryManager {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        model: Arc<dyn ModelClient>,
        history: Arc<DiaryHistory>,
        profiles: Arc<ProfileStore>,
    ) -> Self {
        let context = ContextBuilder::new(Arc::clone(&history), profiles);
        Self {
            documents,
            model,
            history,
            context,
            context_days: DEFAULT_CONTEXT_DAYS,
        }
    }

    /// Look-back window used for the history context
    pub fn with_context_days(mut self, days: i64) -> Self {
        self.context_days = days;
        self
    }

    pub fn context_days(&self) -> i64 {
        self.context_days
    }

    /// Create a diary, analyse it and record it locally
    ///
    /// With `date` the local entry is stamped on that day at the current
    /// time of day.
    pub async fn create_diary_with_analysis(
        &self,
        content: &str,
        title: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<CreatedDiary, IntegrationError> {
        if content.trim().is_empty() {
            return Err(IntegrationError::InvalidInput(
                "diary content is empty".to_string(),
            ));
        }

        let builder = self.context.clone();
        let days = self.context_days;
        let context = tokio::task::spawn_blocking(move || builder.build_full_context(days)).await?;

        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => title.to_string(),
            None => self.generate_title(content).await,
        };

        let handle = self.documents.create_entry(&title, content, date).await?;
        tracing::info!(id = %handle.id, title = %title, "Created diary entry");

        let analysis = self.analyze(content, &context).await;

        let history = Arc::clone(&self.history);
        let created_at = match date {
            Some(day) => day.and_time(now_local().time()),
            None => now_local(),
        };
        let (local_title, local_content, local_analysis) =
            (title.clone(), content.to_string(), analysis.clone());
        let saved_locally = match tokio::task::spawn_blocking(move || {
            history.try_append_entry_at(&local_title, &local_content, local_analysis, created_at)
        })
        .await?
        {
            Ok(entry) => {
                tracing::debug!(sequence = entry.sequence_id, "Recorded entry in history");
                true
            }
            Err(e) => {
                tracing::error!("Failed to record diary in history: {}", e);
                false
            }
        };

        if let Err(e) = self
            .documents
            .append_block(&handle, &analysis_block(&analysis))
            .await
        {
            tracing::warn!(id = %handle.id, "Failed to attach analysis: {}", e);
        }

        Ok(CreatedDiary {
            handle,
            title,
            analysis,
            context_used: context,
            saved_locally,
        })
    }

    /// Append a free-text comment to an existing entry
    pub async fn add_comment(
        &self,
        entry: &EntryHandle,
        comment: &str,
    ) -> Result<(), IntegrationError> {
        if comment.trim().is_empty() {
            return Err(IntegrationError::InvalidInput("comment is empty".to_string()));
        }
        self.documents.append_block(entry, comment).await
    }

    pub async fn recent_diaries(&self, limit: usize) -> Result<Vec<EntryHandle>, IntegrationError> {
        self.documents.query_recent(limit).await
    }

    async fn generate_title(&self, content: &str) -> String {
        match self.model.generate_title(content).await {
            Ok(title) if !title.trim().is_empty() => title.trim().to_string(),
            Ok(_) => fallback_title(),
            Err(e) => {
                tracing::warn!("Title generation failed: {}", e);
                fallback_title()
            }
        }
    }

    async fn analyze(&self, content: &str, context: &str) -> AnalysisResult {
        let (emotions, summary, advice) = tokio::join!(
            self.model.analyze_emotion(content),
            self.model.generate_summary(content),
            self.model.generate_advice(content, context),
        );

        let emotions = emotions.unwrap_or_else(|e| {
            tracing::warn!("Emotion analysis failed: {}", e);
            json!({ "error": e.to_string() })
        });
        let summary = summary.unwrap_or_else(|e| {
            tracing::warn!("Summary generation failed: {}", e);
            format!("要約生成中にエラーが発生しました: {}", e)
        });
        let advice = advice.unwrap_or_else(|e| {
            tracing::warn!("Advice generation failed: {}", e);
            format!("アドバイス生成中にエラーが発生しました: {}", e)
        });

        AnalysisResult::new(emotions, summary, advice)
    }
}

fn fallback_title() -> String {
    format!("日記 - {}", now_local().format("%Y/%m/%d"))
}
