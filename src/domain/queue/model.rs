use crate::domain::audio::AudioArtifact;
use crate::domain::content::ContentPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;
pub const DEFAULT_PRIORITY: i32 = 5;

/// Where an item's content comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// Identifier resolved through the content source at processing time.
    Remote { source_id: String },
    /// Content supplied up front at enqueue time.
    Resolved { payload: ContentPayload },
}

impl SourceRef {
    pub fn source_id(&self) -> Option<&str> {
        match self {
            SourceRef::Remote { source_id } => Some(source_id),
            SourceRef::Resolved { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            SourceRef::Remote { .. } => None,
            SourceRef::Resolved { payload } => Some(&payload.title),
        }
    }
}

/// Flat status discriminant used for filtering and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Pending => "pending",
            StatusKind::Processing => "processing",
            StatusKind::Completed => "completed",
            StatusKind::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusKind::Completed | StatusKind::Failed)
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StatusKind::Pending),
            "processing" => Ok(StatusKind::Processing),
            "completed" => Ok(StatusKind::Completed),
            "failed" => Ok(StatusKind::Failed),
            other => Err(format!(
                "unknown status '{}', expected one of pending, processing, completed, failed",
                other
            )),
        }
    }
}

/// Item status. Each state carries exactly the fields that are meaningful for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Processing { progress: f32 },
    Completed { output: AudioArtifact },
    Failed { error: String },
}

impl ItemStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            ItemStatus::Pending => StatusKind::Pending,
            ItemStatus::Processing { .. } => StatusKind::Processing,
            ItemStatus::Completed { .. } => StatusKind::Completed,
            ItemStatus::Failed { .. } => StatusKind::Failed,
        }
    }
}

/// A unit of work: one post awaiting or having undergone synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub source: SourceRef,
    pub priority: i32,
    #[serde(flatten)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    /// 1 for the first attempt, incremented each time a failed item is re-enqueued.
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_of: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn progress(&self) -> Option<f32> {
        match self.status {
            ItemStatus::Processing { progress } => Some(progress),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&AudioArtifact> {
        match &self.status {
            ItemStatus::Completed { output } => Some(output),
            _ => None,
        }
    }
}

/// Input for [`QueueStore::add`](super::store::QueueStore::add).
///
/// Exactly one of `source_id` and `payload` must be present.
#[derive(Debug, Clone, Default)]
pub struct NewQueueItem {
    pub source_id: Option<String>,
    pub payload: Option<ContentPayload>,
    pub priority: Option<i32>,
    pub subreddit: Option<String>,
}

impl NewQueueItem {
    pub fn remote(source_id: impl Into<String>) -> Self {
        Self {
            source_id: Some(source_id.into()),
            ..Self::default()
        }
    }

    pub fn resolved(payload: ContentPayload) -> Self {
        Self {
            subreddit: payload.subreddit.clone(),
            payload: Some(payload),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = Some(subreddit.into());
        self
    }
}

/// Status change applied through [`QueueStore::update`](super::store::QueueStore::update).
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Progress(f32),
    Completed(AudioArtifact),
    Failed(String),
}

/// Item counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn record(&mut self, kind: StatusKind) {
        self.total += 1;
        match kind {
            StatusKind::Pending => self.pending += 1,
            StatusKind::Processing => self.processing += 1,
            StatusKind::Completed => self.completed += 1,
            StatusKind::Failed => self.failed += 1,
        }
    }
}

/// Label used in breakdowns for items without a subreddit.
pub const UNKNOWN_SUBREDDIT: &str = "unknown";

/// Status counts plus per-priority and per-subreddit item counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBreakdown {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub by_priority: BTreeMap<i32, usize>,
    pub by_subreddit: BTreeMap<String, usize>,
}

impl QueueBreakdown {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a QueueItem>) -> Self {
        let mut breakdown = Self::default();
        for item in items {
            breakdown.counts.record(item.kind());
            *breakdown.by_priority.entry(item.priority).or_default() += 1;
            let subreddit = item.subreddit.as_deref().unwrap_or(UNKNOWN_SUBREDDIT);
            *breakdown
                .by_subreddit
                .entry(subreddit.to_string())
                .or_default() += 1;
        }
        breakdown
    }
}

pub fn clamp_priority(priority: i32) -> i32 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}
