use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::PollReport;

/// How a poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    Completed,
    Failed,
    /// The poll deadline expired and the poll was cancelled
    TimedOut,
}

/// Summary of the most recent poll, exposed by the status API
#[derive(Debug, Clone, Serialize)]
pub struct PollSummary {
    pub timestamp: DateTime<Utc>,
    pub outcome: PollOutcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PollReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub disk_points: usize,
}

impl PollSummary {
    pub fn completed(timestamp: DateTime<Utc>, duration_ms: u64, report: PollReport, disk_points: usize) -> Self {
        Self {
            timestamp,
            outcome: PollOutcome::Completed,
            duration_ms,
            report: Some(report),
            error: None,
            disk_points,
        }
    }

    pub fn failed(timestamp: DateTime<Utc>, duration_ms: u64, error: String, disk_points: usize) -> Self {
        Self {
            timestamp,
            outcome: PollOutcome::Failed,
            duration_ms,
            report: None,
            error: Some(error),
            disk_points,
        }
    }

    pub fn timed_out(timestamp: DateTime<Utc>, duration_ms: u64) -> Self {
        Self {
            timestamp,
            outcome: PollOutcome::TimedOut,
            duration_ms,
            report: None,
            error: None,
            disk_points: 0,
        }
    }
}

/// Shared holder for the latest poll summary
#[derive(Debug, Default)]
pub struct StatusBoard {
    last: RwLock<Option<PollSummary>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, summary: PollSummary) {
        *self.last.write().await = Some(summary);
    }

    pub async fn last(&self) -> Option<PollSummary> {
        self.last.read().await.clone()
    }
}
