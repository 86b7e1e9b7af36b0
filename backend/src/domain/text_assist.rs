//! # Text Assist
//!
//! Small AI helpers used by the forms: tidy up free text, sanity-check a
//! health entry and narrate a child's recent health trends.
//!
//! Every helper fails closed. When no completion backend is configured, or
//! the backend errors, the caller gets the neutral answer (original text,
//! "valid", or no analysis) and the failure is only logged.

use async_trait::async_trait;
use chrono::Duration;
use log::{info, warn};
use shared::{HealthInputValidation, HealthLog, HealthLogType};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::time::now;
use crate::storage::{ChildRepository, DbConnection, HealthLogRepository};

const TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(String),
    #[error("completion returned no text")]
    EmptyReply,
}

/// Opaque text-completion backend
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Clone)]
pub struct TextAssistService {
    completion: Option<Arc<dyn TextCompletion>>,
    children: ChildRepository,
    health_logs: HealthLogRepository,
}

impl TextAssistService {
    pub fn new(db: DbConnection, completion: Option<Arc<dyn TextCompletion>>) -> Self {
        Self {
            completion,
            children: ChildRepository::new(db.clone()),
            health_logs: HealthLogRepository::new(db),
        }
    }

    async fn ask(&self, operation: &str, prompt: &str) -> Option<String> {
        let Some(completion) = self.completion.as_ref() else {
            info!("{}: text completion is not configured", operation);
            return None;
        };

        match completion.complete(prompt).await {
            Ok(reply) if !reply.trim().is_empty() => Some(reply.trim().to_string()),
            Ok(_) => {
                warn!("{}: completion returned an empty reply", operation);
                None
            }
            Err(e) => {
                warn!("{}: completion failed: {}", operation, e);
                None
            }
        }
    }

    /// Fix capitalization and obvious spelling mistakes, falling back to the
    /// input unchanged
    pub async fn capitalize_and_correct(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let prompt = format!(
            "Fix the capitalization and any obvious spelling mistakes in the following text. \
             Keep the meaning and wording otherwise unchanged. Reply with the corrected text only.\n\n{}",
            text
        );

        self.ask("capitalize_and_correct", &prompt)
            .await
            .unwrap_or_else(|| text.to_string())
    }

    /// Check that a health entry value makes sense for its type. Only free-text
    /// types are checked; sleep hours and blank values pass through.
    pub async fn validate_health_input(&self, log_type: HealthLogType, value: &str) -> HealthInputValidation {
        let accepted = HealthInputValidation {
            is_valid: true,
            suggestion: None,
        };

        let checked = matches!(
            log_type,
            HealthLogType::Mood | HealthLogType::Meal | HealthLogType::Symptom | HealthLogType::Medicine
        );
        if !checked || value.trim().is_empty() {
            return accepted;
        }

        let prompt = format!(
            "A parent is logging a child's {} as \"{}\". If this is a sensible entry for that \
             category, reply with exactly VALID. Otherwise reply with one short suggestion for \
             what they probably meant.",
            log_type,
            value.trim()
        );

        match self.ask("validate_health_input", &prompt).await {
            Some(reply) if reply.trim_end_matches('.').eq_ignore_ascii_case("VALID") => accepted,
            Some(suggestion) => HealthInputValidation {
                is_valid: false,
                suggestion: Some(suggestion),
            },
            None => accepted,
        }
    }

    /// Short narrative over the child's last 30 days of health logs
    pub async fn trend_analysis(&self, child_id: &str) -> DomainResult<Option<String>> {
        info!("Generating trend analysis for child {}", child_id);

        let child = self.children.get_child(child_id).await?.ok_or_else(|| {
            warn!("Child not found: {}", child_id);
            DomainError::not_found("Child", child_id)
        })?;

        let end = now();
        let logs = self
            .health_logs
            .list_in_window(&child.id, &(end - Duration::days(TREND_WINDOW_DAYS)), &end)
            .await?;
        if logs.is_empty() {
            info!("No health logs for child {} in the last {} days", child.id, TREND_WINDOW_DAYS);
            return Ok(None);
        }

        let prompt = format!(
            "Here are {}'s health log entries from the last {} days, newest first:\n{}\n\n\
             In three or four sentences, describe any patterns in mood, sleep, meals, \
             symptoms or medicine a parent should notice. Do not give medical advice.",
            child.name,
            TREND_WINDOW_DAYS,
            format_logs(&logs)
        );

        Ok(self.ask("trend_analysis", &prompt).await)
    }
}

fn format_logs(logs: &[HealthLog]) -> String {
    logs.iter()
        .map(|log| {
            let mut line = format!("- {} {}: {}", log.timestamp.format("%Y-%m-%d %H:%M"), log.log_type, log.value);
            if let Some(notes) = log.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                line.push_str(&format!(" ({})", notes.trim()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
